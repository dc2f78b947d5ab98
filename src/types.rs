use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PlantError, PlantResult};

/// Field-keyed object (internal names)
pub type Record = Map<String, Value>;

/// Header-keyed object (spreadsheet names)
pub type Row = Map<String, Value>;

/// Serialize a typed entity into an untyped record
pub fn to_record<T: Serialize>(value: &T) -> PlantResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(PlantError::Validation(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize an untyped record into a typed entity
pub fn from_record<T: DeserializeOwned>(record: Record) -> PlantResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

//==============================================================================
// Order status
//==============================================================================

pub const STATUS_PENDING: &str = "Pendiente";
pub const STATUS_IN_PROGRESS: &str = "En Proceso";
pub const STATUS_COMPLETED: &str = "Completada";

//==============================================================================
// Enumerated cells
//==============================================================================

/// Production priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    Baja,
    Media,
    Alta,
}

impl FromStr for Priority {
    type Err = PlantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baja" => Ok(Priority::Baja),
            "media" => Ok(Priority::Media),
            "alta" => Ok(Priority::Alta),
            _ => Err(PlantError::Validation(format!(
                "Invalid priority '{}' (expected Baja, Media or Alta)",
                s
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Baja => "Baja",
            Priority::Media => "Media",
            Priority::Alta => "Alta",
        };
        f.write_str(s)
    }
}

/// "Material disponible (Sí/No)"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Availability {
    #[serde(rename = "Sí")]
    Si,
    No,
}

impl FromStr for Availability {
    type Err = PlantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sí" | "si" | "yes" | "true" => Ok(Availability::Si),
            "no" | "false" => Ok(Availability::No),
            _ => Err(PlantError::Validation(format!(
                "Invalid availability '{}' (expected Sí or No)",
                s
            ))),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Availability::Si => "Sí",
            Availability::No => "No",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MaintenanceKind {
    Preventivo,
    Correctivo,
}

impl FromStr for MaintenanceKind {
    type Err = PlantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preventivo" => Ok(MaintenanceKind::Preventivo),
            "correctivo" => Ok(MaintenanceKind::Correctivo),
            _ => Err(PlantError::Validation(format!(
                "Invalid maintenance type '{}' (expected Preventivo or Correctivo)",
                s
            ))),
        }
    }
}

impl fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MaintenanceKind::Preventivo => "Preventivo",
            MaintenanceKind::Correctivo => "Correctivo",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InspectionResult {
    Aprobado,
    Rechazado,
}

impl FromStr for InspectionResult {
    type Err = PlantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aprobado" => Ok(InspectionResult::Aprobado),
            "rechazado" => Ok(InspectionResult::Rechazado),
            _ => Err(PlantError::Validation(format!(
                "Invalid inspection result '{}' (expected Aprobado or Rechazado)",
                s
            ))),
        }
    }
}

impl fmt::Display for InspectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InspectionResult::Aprobado => "Aprobado",
            InspectionResult::Rechazado => "Rechazado",
        })
    }
}

//==============================================================================
// Loose cell decoding
//==============================================================================

/// Spreadsheet cells carry whatever the user typed. These helpers accept the
/// usual shapes and turn blanks into `None`.
mod cell {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use tracing::warn;

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => Some(other.to_string()),
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    match trimmed.replace(',', ".").parse::<f64>() {
                        Ok(n) if n.is_finite() => Some(n),
                        _ => {
                            warn!(cell = %trimmed, "ignoring non-numeric cell");
                            None
                        }
                    }
                }
            }
            Some(other) => {
                warn!(cell = %other, "ignoring non-numeric cell");
                None
            }
        })
    }

    pub fn choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        let Some(raw) = text(deserializer)? else {
            return Ok(None);
        };
        match raw.parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                warn!(cell = %raw, "ignoring unrecognised value");
                Ok(None)
            }
        }
    }

    /// Whole numbers go out without a trailing `.0`
    pub fn write_number<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => serializer.serialize_i64(*n as i64),
            Some(n) => serializer.serialize_f64(*n),
            None => serializer.serialize_none(),
        }
    }
}

//==============================================================================
// Entities
//==============================================================================

/// Orden de producción (sheet `ordenes`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub no_ot: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub fecha_emision: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub no_orden_compra: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub referencia: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cantidad_unidades: Option<f64>,
    #[serde(default, deserialize_with = "cell::choice", skip_serializing_if = "Option::is_none")]
    pub material_disponible: Option<Availability>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub tiempo_estimado_dias: Option<f64>,
    #[serde(default, deserialize_with = "cell::choice", skip_serializing_if = "Option::is_none")]
    pub prioridad: Option<Priority>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub observacion: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl ProductionOrder {
    pub fn is_completed(&self) -> bool {
        self.estado.as_deref() == Some(STATUS_COMPLETED)
    }

    /// Pending or in progress
    pub fn is_open(&self) -> bool {
        matches!(
            self.estado.as_deref(),
            Some(STATUS_PENDING) | Some(STATUS_IN_PROGRESS)
        )
    }
}

/// Producto (sheet `productos`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub codigo_nuevo: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub producto: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub ubicacion_almacen: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub materia_prima: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub calibre: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub piezas_por_hora: Option<f64>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub ancho_tira_mm: Option<f64>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub medidas_pieza_mm: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub acabado: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub piezas_lamina_4x8_a: Option<f64>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub piezas_por_lamina_4x8: Option<f64>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub piezas_por_lamina_2x1: Option<f64>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub empaque_de: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}

impl Product {
    /// Case-insensitive substring match on name or code
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.producto, &self.codigo]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Cliente (sheet `clientes`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub nit: Option<String>,
}

/// Personal (sheet `personal`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub cedula: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,
}

/// Máquina (sheet `maquinas`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub cod_actual: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub adquirida_en: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

/// Mantenimiento (sheet `mantenimiento`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Maintenance {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub id_mantenimiento: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub maquina_equipo: Option<String>,
    #[serde(default, deserialize_with = "cell::choice", skip_serializing_if = "Option::is_none")]
    pub tipo_mantenimiento: Option<MaintenanceKind>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub fecha_programada: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub tecnico_responsable: Option<String>,
}

/// Materia prima (sheet `materiasPrimas`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMaterial {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cantidad_stock: Option<f64>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub unidad_medida: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::number",
        serialize_with = "cell::write_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub peso_unitario_k: Option<f64>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub proveedor: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub fecha_ingreso: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

/// Registro de calidad (sheet `calidad`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub id_reg_calidad: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub no_ot: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub proceso_inspeccionado: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub fecha_hora_inspeccion: Option<String>,
    #[serde(default, deserialize_with = "cell::text", skip_serializing_if = "Option::is_none")]
    pub responsable: Option<String>,
    #[serde(default, deserialize_with = "cell::choice", skip_serializing_if = "Option::is_none")]
    pub aprobado_rechazado: Option<InspectionResult>,
}

//==============================================================================
// Derived data
//==============================================================================

/// Dashboard counters over the orders sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiData {
    pub total_ordenes: usize,
    pub ordenes_completadas: usize,
    pub porcentaje_completadas: f64,
}

impl KpiData {
    pub fn from_orders(orders: &[ProductionOrder]) -> Self {
        let total_ordenes = orders.len();
        let ordenes_completadas = orders.iter().filter(|o| o.is_completed()).count();
        let porcentaje_completadas = if total_ordenes > 0 {
            ordenes_completadas as f64 / total_ordenes as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_ordenes,
            ordenes_completadas,
            porcentaje_completadas,
        }
    }
}

/// Priority suggested by the assistant, with its reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritySuggestion {
    pub prioridad: String,
    pub justificacion: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn order(estado: &str) -> ProductionOrder {
        ProductionOrder {
            estado: Some(estado.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_order_decodes_loose_cells() {
        let record = json!({
            "no_ot": 1024,
            "cliente": "Muebles Andinos",
            "cantidad_unidades": "250",
            "tiempo_estimado_dias": "",
            "material_disponible": "Si",
            "prioridad": "alta",
            "observacion": "   "
        });
        let order: ProductionOrder = serde_json::from_value(record).unwrap();

        assert_eq!(order.no_ot.as_deref(), Some("1024"));
        assert_eq!(order.cantidad_unidades, Some(250.0));
        assert_eq!(order.tiempo_estimado_dias, None);
        assert_eq!(order.material_disponible, Some(Availability::Si));
        assert_eq!(order.prioridad, Some(Priority::Alta));
        assert_eq!(order.observacion, None);
    }

    #[test]
    fn test_unknown_enum_value_becomes_none() {
        let order: ProductionOrder =
            serde_json::from_value(json!({"prioridad": "Urgentísima"})).unwrap();
        assert_eq!(order.prioridad, None);
    }

    #[test]
    fn test_order_serializes_whole_numbers_and_skips_blanks() {
        let order = ProductionOrder {
            no_ot: Some("7".into()),
            cantidad_unidades: Some(120.0),
            tiempo_estimado_dias: Some(2.5),
            material_disponible: Some(Availability::Si),
            prioridad: Some(Priority::Media),
            ..Default::default()
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(
            value,
            json!({
                "no_ot": "7",
                "cantidad_unidades": 120,
                "material_disponible": "Sí",
                "tiempo_estimado_dias": 2.5,
                "prioridad": "Media"
            })
        );
    }

    #[test]
    fn test_non_finite_text_is_not_a_number() {
        for text in ["NaN", "inf", "-infinity"] {
            let material: RawMaterial =
                serde_json::from_value(json!({ "peso_unitario_k": text })).unwrap();
            assert_eq!(material.peso_unitario_k, None, "{}", text);
        }
    }

    #[test]
    fn test_decimal_comma_is_accepted() {
        let material: RawMaterial =
            serde_json::from_value(json!({"peso_unitario_k": "1,75"})).unwrap();
        assert_eq!(material.peso_unitario_k, Some(1.75));
    }

    #[test]
    fn test_record_helpers() {
        let staff = Staff {
            nombre: Some("Ana Ruiz".into()),
            cargo: Some("Soldadora".into()),
            ..Default::default()
        };
        let record = to_record(&staff).unwrap();
        assert_eq!(record.len(), 2);
        let back: Staff = from_record(record).unwrap();
        assert_eq!(back, staff);
    }

    #[test]
    fn test_kpis_count_only_completed() {
        let orders = vec![
            order(STATUS_COMPLETED),
            order(STATUS_PENDING),
            order(STATUS_IN_PROGRESS),
            order("completada"),
        ];
        let kpi = KpiData::from_orders(&orders);
        assert_eq!(kpi.total_ordenes, 4);
        assert_eq!(kpi.ordenes_completadas, 1);
        assert!((kpi.porcentaje_completadas - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_kpis_empty() {
        let kpi = KpiData::from_orders(&[]);
        assert_eq!(kpi.total_ordenes, 0);
        assert_eq!(kpi.porcentaje_completadas, 0.0);
    }

    #[test]
    fn test_order_open_states() {
        assert!(order(STATUS_PENDING).is_open());
        assert!(order(STATUS_IN_PROGRESS).is_open());
        assert!(!order(STATUS_COMPLETED).is_open());
        assert!(!ProductionOrder::default().is_open());
    }

    #[test]
    fn test_product_matches_name_or_code() {
        let product = Product {
            codigo: Some("BIS-010".into()),
            producto: Some("Bisagra Cazoleta".into()),
            ..Default::default()
        };
        assert!(product.matches("bisagra"));
        assert!(product.matches("bis-0"));
        assert!(product.matches(""));
        assert!(!product.matches("tornillo"));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Preventivo".parse::<MaintenanceKind>().unwrap(), MaintenanceKind::Preventivo);
        assert_eq!("RECHAZADO".parse::<InspectionResult>().unwrap(), InspectionResult::Rechazado);
        assert!("quizás".parse::<Availability>().is_err());
        assert_eq!(Availability::Si.to_string(), "Sí");
    }
}
