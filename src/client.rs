//! Typed per-sheet operations
//!
//! Every screen of the plant follows the same cycle: fetch a sheet, show it,
//! append a row, fetch again. [`PlantClient`] wraps that cycle for each sheet,
//! running records through the column mapping on the way in and out.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PlantError, PlantResult};
use crate::gateway::{PostPayload, SheetBackend, WriteOutcome};
use crate::mapping::{headers_of, keyed_row_to_record, record_to_row, Sheet};
use crate::types::{
    from_record, to_record, Client, KpiData, Machine, Maintenance, Product, ProductionOrder,
    QualityRecord, RawMaterial, Record, Staff,
};

/// Everything the orders dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub ordenes: Vec<ProductionOrder>,
    pub kpis: KpiData,
}

/// Choices offered when creating an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderFormOptions {
    pub clientes: Vec<Client>,
    pub productos: Vec<Product>,
}

#[derive(Clone)]
pub struct PlantClient {
    backend: Arc<dyn SheetBackend>,
}

impl PlantClient {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        Self { backend }
    }

    //==========================================================================
    // Untyped access
    //==========================================================================

    /// Fetch a sheet and map each row to a field-keyed record
    pub async fn fetch_records(&self, sheet: Sheet) -> PlantResult<Vec<Record>> {
        let rows = self.backend.fetch_rows(sheet.name()).await?;
        let headers = headers_of(&rows);
        let mapping = sheet.mapping();
        let records: Vec<Record> = rows
            .iter()
            .map(|row| keyed_row_to_record(row, &headers, &mapping))
            .collect();
        debug!(sheet = %sheet, records = records.len(), "mapped sheet rows");
        Ok(records)
    }

    /// Append a record; fields the sheet has no column for are dropped
    pub async fn create_record(&self, sheet: Sheet, record: &Record) -> PlantResult<WriteOutcome> {
        let row = record_to_row(record, &sheet.mapping());
        let outcome = self
            .backend
            .post(&PostPayload::append(sheet.name(), row))
            .await?;
        info!(sheet = %sheet, outcome = ?outcome, "record created");
        Ok(outcome)
    }

    /// Overwrite the given fields on the row identified by `unique_id`
    pub async fn update_record(
        &self,
        sheet: Sheet,
        unique_id: &str,
        changes: &Record,
    ) -> PlantResult<WriteOutcome> {
        let row = record_to_row(changes, &sheet.mapping());
        let outcome = self
            .backend
            .post(&PostPayload::update(sheet.name(), unique_id, row))
            .await?;
        info!(sheet = %sheet, id = unique_id, outcome = ?outcome, "record updated");
        Ok(outcome)
    }

    //==========================================================================
    // Typed access
    //==========================================================================

    pub async fn fetch<T: DeserializeOwned>(&self, sheet: Sheet) -> PlantResult<Vec<T>> {
        self.fetch_records(sheet)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    pub async fn create<T: Serialize>(&self, sheet: Sheet, value: &T) -> PlantResult<WriteOutcome> {
        self.create_record(sheet, &to_record(value)?).await
    }

    pub async fn fetch_orders(&self) -> PlantResult<Vec<ProductionOrder>> {
        self.fetch(Sheet::Orders).await
    }

    pub async fn create_order(&self, order: &ProductionOrder) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Orders, order).await
    }

    pub async fn fetch_kpis(&self) -> PlantResult<KpiData> {
        let orders = self.fetch_orders().await?;
        Ok(KpiData::from_orders(&orders))
    }

    /// Orders plus their KPIs from a single fetch
    pub async fn dashboard(&self) -> PlantResult<Dashboard> {
        let ordenes = self.fetch_orders().await?;
        let kpis = KpiData::from_orders(&ordenes);
        Ok(Dashboard { ordenes, kpis })
    }

    /// Locate an order by its OT number
    pub async fn find_order(&self, no_ot: &str) -> PlantResult<ProductionOrder> {
        let wanted = no_ot.trim();
        self.fetch_orders()
            .await?
            .into_iter()
            .find(|o| o.no_ot.as_deref().map(str::trim) == Some(wanted))
            .ok_or_else(|| PlantError::NotFound(format!("orden {}", wanted)))
    }

    pub async fn fetch_products(&self) -> PlantResult<Vec<Product>> {
        self.fetch(Sheet::Products).await
    }

    pub async fn create_product(&self, product: &Product) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Products, product).await
    }

    /// Edit a product in place. Every mapped field of `changes` is sent as
    /// given, so a blank value clears its cell.
    pub async fn update_product(&self, codigo: &str, changes: &Record) -> PlantResult<WriteOutcome> {
        self.update_record(Sheet::Products, codigo, changes).await
    }

    pub async fn fetch_clients(&self) -> PlantResult<Vec<Client>> {
        self.fetch(Sheet::Clients).await
    }

    pub async fn create_client(&self, client: &Client) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Clients, client).await
    }

    /// Clients and products, fetched concurrently
    pub async fn order_form_options(&self) -> PlantResult<OrderFormOptions> {
        let (clientes, productos) = tokio::try_join!(self.fetch_clients(), self.fetch_products())?;
        Ok(OrderFormOptions {
            clientes,
            productos,
        })
    }

    pub async fn fetch_staff(&self) -> PlantResult<Vec<Staff>> {
        self.fetch(Sheet::Staff).await
    }

    pub async fn create_staff(&self, staff: &Staff) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Staff, staff).await
    }

    pub async fn fetch_machines(&self) -> PlantResult<Vec<Machine>> {
        self.fetch(Sheet::Machines).await
    }

    pub async fn create_machine(&self, machine: &Machine) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Machines, machine).await
    }

    pub async fn fetch_maintenance(&self) -> PlantResult<Vec<Maintenance>> {
        self.fetch(Sheet::Maintenance).await
    }

    pub async fn create_maintenance(&self, entry: &Maintenance) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Maintenance, entry).await
    }

    pub async fn fetch_raw_materials(&self) -> PlantResult<Vec<RawMaterial>> {
        self.fetch(Sheet::RawMaterials).await
    }

    pub async fn create_raw_material(&self, material: &RawMaterial) -> PlantResult<WriteOutcome> {
        self.create(Sheet::RawMaterials, material).await
    }

    pub async fn fetch_quality_records(&self) -> PlantResult<Vec<QualityRecord>> {
        self.fetch(Sheet::Quality).await
    }

    pub async fn create_quality_record(&self, record: &QualityRecord) -> PlantResult<WriteOutcome> {
        self.create(Sheet::Quality, record).await
    }
}

/// Products whose name or code contains `term`, ignoring case
pub fn search_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| p.matches(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemorySheetBackend;
    use crate::types::{Priority, Row};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn seeded() -> (Arc<MemorySheetBackend>, PlantClient) {
        let backend = Arc::new(
            MemorySheetBackend::new()
                .with_rows(
                    "ordenes",
                    vec![
                        row(&[
                            ("No. OT", json!(501)),
                            ("Cliente", json!("Carpintería Ruiz")),
                            ("Prioridad", json!("Alta")),
                            ("ESTADO", json!("Completada")),
                            ("Foto", json!("x.png")),
                        ]),
                        row(&[
                            ("No. OT", json!(502)),
                            ("Cliente", json!("Herrajes del Norte")),
                            ("Prioridad", json!("Baja")),
                            ("ESTADO", json!("Pendiente")),
                            ("Foto", json!("")),
                        ]),
                    ],
                )
                .with_rows(
                    "clientes",
                    vec![row(&[("ID", json!(1)), ("NOMBRE", json!("Ruiz"))])],
                )
                .with_rows(
                    "productos",
                    vec![row(&[
                        ("CÓDIGO", json!("BIS-010")),
                        ("PRODUCTO", json!("Bisagra")),
                        ("ACABADO", json!("Natural")),
                    ])],
                ),
        );
        let client = PlantClient::new(backend.clone());
        (backend, client)
    }

    #[tokio::test]
    async fn test_fetch_records_maps_and_drops() {
        let (_, client) = seeded();
        let records = client.fetch_records(Sheet::Orders).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["no_ot"], json!(501));
        assert!(!records[0].contains_key("Foto"));
        assert!(!records[0].contains_key("foto"));
    }

    #[tokio::test]
    async fn test_fetch_orders_typed() {
        let (_, client) = seeded();
        let orders = client.fetch_orders().await.unwrap();
        assert_eq!(orders[1].no_ot.as_deref(), Some("502"));
        assert_eq!(orders[1].prioridad, Some(Priority::Baja));
    }

    #[tokio::test]
    async fn test_dashboard_and_kpis_agree() {
        let (_, client) = seeded();
        let dashboard = client.dashboard().await.unwrap();
        let kpis = client.fetch_kpis().await.unwrap();
        assert_eq!(dashboard.kpis, kpis);
        assert_eq!(kpis.total_ordenes, 2);
        assert_eq!(kpis.ordenes_completadas, 1);
        assert_eq!(kpis.porcentaje_completadas, 50.0);
    }

    #[tokio::test]
    async fn test_find_order() {
        let (_, client) = seeded();
        let order = client.find_order(" 502 ").await.unwrap();
        assert_eq!(order.cliente.as_deref(), Some("Herrajes del Norte"));

        let err = client.find_order("999").await.unwrap_err();
        assert!(matches!(err, PlantError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_order_posts_header_keyed_row() {
        let (backend, client) = seeded();
        let order = ProductionOrder {
            no_ot: Some("503".into()),
            cliente: Some("Ruiz".into()),
            cantidad_unidades: Some(40.0),
            prioridad: Some(Priority::Media),
            ..Default::default()
        };

        let outcome = client.create_order(&order).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Confirmed);
        let rows = backend.rows("ordenes");
        let last = rows.last().unwrap();
        assert_eq!(last["No. OT"], json!("503"));
        assert_eq!(last["Cantidad (Unidades)"], json!(40));
        assert_eq!(last["Prioridad"], json!("Media"));
    }

    #[tokio::test]
    async fn test_create_record_drops_unknown_fields() {
        let (backend, client) = seeded();
        let mut record = Record::new();
        record.insert("nombre".into(), json!("Pedro"));
        record.insert("telefono".into(), json!("555"));

        client.create_record(Sheet::Staff, &record).await.unwrap();

        let rows = backend.rows("personal");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0]["NOMBRE"], json!("Pedro"));
    }

    #[tokio::test]
    async fn test_update_product_sends_only_given_fields() {
        let (backend, client) = seeded();
        let mut changes = Record::new();
        changes.insert("acabado".into(), json!("Cromado"));

        client.update_product("BIS-010", &changes).await.unwrap();

        let rows = backend.rows("productos");
        assert_eq!(rows[0]["ACABADO"], json!("Cromado"));
        assert_eq!(rows[0]["PRODUCTO"], json!("Bisagra"));
    }

    #[tokio::test]
    async fn test_update_product_keeps_blank_and_free_text_values() {
        let (backend, client) = seeded();
        let mut changes = Record::new();
        changes.insert("acabado".into(), json!(""));
        changes.insert("piezas_por_hora".into(), json!("cuarenta"));

        let outcome = client.update_product("BIS-010", &changes).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Confirmed);
        let rows = backend.rows("productos");
        assert_eq!(rows[0]["ACABADO"], json!(""));
        assert_eq!(rows[0]["PIEZAS POR HORA"], json!("cuarenta"));
        assert_eq!(rows[0]["PRODUCTO"], json!("Bisagra"));
    }

    #[tokio::test]
    async fn test_order_form_options() {
        let (_, client) = seeded();
        let options = client.order_form_options().await.unwrap();
        assert_eq!(options.clientes.len(), 1);
        assert_eq!(options.productos[0].codigo.as_deref(), Some("BIS-010"));
    }

    #[tokio::test]
    async fn test_order_form_options_fails_when_a_sheet_fails() {
        let backend = Arc::new(MemorySheetBackend::new().with_rows("clientes", vec![]));
        let client = PlantClient::new(backend);
        assert!(client.order_form_options().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_sheet_yields_no_records() {
        let backend = Arc::new(MemorySheetBackend::new().with_rows("maquinas", vec![]));
        let client = PlantClient::new(backend);
        assert!(client.fetch_machines().await.unwrap().is_empty());
    }

    #[test]
    fn test_search_products() {
        let products = vec![
            Product {
                codigo: Some("BIS-010".into()),
                producto: Some("Bisagra".into()),
                ..Default::default()
            },
            Product {
                codigo: Some("TOR-200".into()),
                producto: Some("Tornillo".into()),
                ..Default::default()
            },
        ];
        assert_eq!(search_products(&products, "TOR").len(), 1);
        assert_eq!(search_products(&products, "").len(), 2);
        assert!(search_products(&products, "clavo").is_empty());
    }
}
