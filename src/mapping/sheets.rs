//! Built-in sheets and their column mappings.
//!
//! Headers are spelled exactly as in the production spreadsheet, typos and
//! accents included.

use std::fmt;
use std::str::FromStr;

use super::ColumnMapping;
use crate::error::PlantError;

const ORDERS: &[(&str, &str)] = &[
    ("No. OT", "no_ot"),
    ("Cliente", "cliente"),
    ("Fecha de Emision", "fecha_emision"),
    ("No. Orden de Compra", "no_orden_compra"),
    ("Referencia", "referencia"),
    ("Descripción", "descripcion"),
    ("Cantidad (Unidades)", "cantidad_unidades"),
    ("Material disponible (Sí/No)", "material_disponible"),
    ("Tiempo estimado (Días)", "tiempo_estimado_dias"),
    ("Prioridad", "prioridad"),
    ("ESTADO", "estado"),
    ("OBSERVACION", "observacion"),
    ("MATERIAL", "material"),
];

const PRODUCTS: &[(&str, &str)] = &[
    ("CÓDIGO", "codigo"),
    ("CODIGO NUEVO", "codigo_nuevo"),
    ("CLIENTE", "cliente"),
    ("PRODUCTO", "producto"),
    ("MATERIAL", "material"),
    ("Ubicación en almacén", "ubicacion_almacen"),
    ("MAERIA PRIMA", "materia_prima"),
    ("CALIBRE", "calibre"),
    ("PIEZAS POR HORA", "piezas_por_hora"),
    ("ANCHO DE TIRA mm", "ancho_tira_mm"),
    ("MEDIDAS X PIEZA mm", "medidas_pieza_mm"),
    ("ACABADO", "acabado"),
    ("PIEZAS LAMINA DE 4 x 8 A", "piezas_lamina_4x8_a"),
    ("PIEZAS POR LAMINA DE 4 x 8", "piezas_por_lamina_4x8"),
    ("PIEZAS POR LAMINA DE 2 x 1", "piezas_por_lamina_2x1"),
    ("EMPAQUE DE", "empaque_de"),
    ("IMAGEN URL", "imagen_url"),
];

const STAFF: &[(&str, &str)] = &[("NOMBRE", "nombre"), ("CEDULA", "cedula"), ("CARGO", "cargo")];

const CLIENTS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("NOMBRE", "nombre"),
    ("EMPRESA", "empresa"),
    ("NIT", "nit"),
];

const MACHINES: &[(&str, &str)] = &[
    ("COD. ACTUAL", "cod_actual"),
    ("DESCRIPCIÓN", "descripcion"),
    ("ADQUIRIDA EN", "adquirida_en"),
    ("ESTADO", "estado"),
    ("OBSERVACIONES", "observaciones"),
];

const MAINTENANCE: &[(&str, &str)] = &[
    ("ID Mantenimiento", "id_mantenimiento"),
    ("Máquina/Equipo", "maquina_equipo"),
    (
        "Tipo de mantenimiento (Preventivo/Correctivo)",
        "tipo_mantenimiento",
    ),
    ("Fecha programada", "fecha_programada"),
    ("Estado", "estado"),
    ("Técnico responsable", "tecnico_responsable"),
];

const RAW_MATERIALS: &[(&str, &str)] = &[
    ("MATERIAL", "material"),
    ("Descripción", "descripcion"),
    ("Cantidad en stock", "cantidad_stock"),
    ("Unidad de medida", "unidad_medida"),
    ("Peso unitario (K)", "peso_unitario_k"),
    ("Proveedor", "proveedor"),
    ("Fecha de ingreso", "fecha_ingreso"),
    ("Estado (Disponible/Reservado)", "estado"),
];

const QUALITY: &[(&str, &str)] = &[
    ("ID REG CALIDAD", "id_reg_calidad"),
    ("No. OT", "no_ot"),
    ("Proceso inspeccionado", "proceso_inspeccionado"),
    ("Fecha hora de inspeccion", "fecha_hora_inspeccion"),
    ("RESPONSABLE", "responsable"),
    ("Aprobado / Rechazado", "aprobado_rechazado"),
];

/// A named tab of the backing spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Orders,
    Products,
    Clients,
    Staff,
    Machines,
    Maintenance,
    RawMaterials,
    Quality,
}

impl Sheet {
    pub const ALL: [Sheet; 8] = [
        Sheet::Orders,
        Sheet::Products,
        Sheet::Clients,
        Sheet::Staff,
        Sheet::Machines,
        Sheet::Maintenance,
        Sheet::RawMaterials,
        Sheet::Quality,
    ];

    /// Tab name sent as the `sheet` query parameter and `sheetName` body field
    pub fn name(self) -> &'static str {
        match self {
            Sheet::Orders => "ordenes",
            Sheet::Products => "productos",
            Sheet::Clients => "clientes",
            Sheet::Staff => "personal",
            Sheet::Machines => "maquinas",
            Sheet::Maintenance => "mantenimiento",
            Sheet::RawMaterials => "materiasPrimas",
            Sheet::Quality => "calidad",
        }
    }

    /// English alias accepted on the command line
    pub fn alias(self) -> &'static str {
        match self {
            Sheet::Orders => "orders",
            Sheet::Products => "products",
            Sheet::Clients => "clients",
            Sheet::Staff => "staff",
            Sheet::Machines => "machines",
            Sheet::Maintenance => "maintenance",
            Sheet::RawMaterials => "raw-materials",
            Sheet::Quality => "quality",
        }
    }

    fn pairs(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Sheet::Orders => ORDERS,
            Sheet::Products => PRODUCTS,
            Sheet::Clients => CLIENTS,
            Sheet::Staff => STAFF,
            Sheet::Machines => MACHINES,
            Sheet::Maintenance => MAINTENANCE,
            Sheet::RawMaterials => RAW_MATERIALS,
            Sheet::Quality => QUALITY,
        }
    }

    pub fn mapping(self) -> ColumnMapping {
        ColumnMapping::new(self.pairs().iter().copied())
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sheet {
    type Err = PlantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Sheet::ALL
            .into_iter()
            .find(|sheet| {
                sheet.name().eq_ignore_ascii_case(wanted)
                    || sheet.alias().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Sheet::ALL.iter().map(|s| s.alias()).collect();
                PlantError::Validation(format!(
                    "Unknown sheet '{}'. Known sheets: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_names_match_endpoint() {
        assert_eq!(Sheet::Orders.name(), "ordenes");
        assert_eq!(Sheet::RawMaterials.name(), "materiasPrimas");
        assert_eq!(Sheet::Quality.to_string(), "calidad");
    }

    #[test]
    fn test_parse_by_name_or_alias() {
        assert_eq!("ordenes".parse::<Sheet>().unwrap(), Sheet::Orders);
        assert_eq!("orders".parse::<Sheet>().unwrap(), Sheet::Orders);
        assert_eq!("MATERIASPRIMAS".parse::<Sheet>().unwrap(), Sheet::RawMaterials);
        assert_eq!("raw-materials".parse::<Sheet>().unwrap(), Sheet::RawMaterials);
        assert_eq!(" staff ".parse::<Sheet>().unwrap(), Sheet::Staff);
    }

    #[test]
    fn test_parse_unknown_sheet_lists_known() {
        let err = "facturas".parse::<Sheet>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("facturas"));
        assert!(msg.contains("orders"));
        assert!(msg.contains("quality"));
    }

    #[test]
    fn test_every_mapping_is_non_empty_and_fields_unique() {
        for sheet in Sheet::ALL {
            let mapping = sheet.mapping();
            assert!(!mapping.is_empty(), "{} has no columns", sheet);
            let mut fields: Vec<&str> = mapping.fields().collect();
            let before = fields.len();
            fields.sort_unstable();
            fields.dedup();
            assert_eq!(before, fields.len(), "{} repeats a field", sheet);
        }
    }

    #[test]
    fn test_spreadsheet_quirks_are_preserved() {
        assert_eq!(
            Sheet::Products.mapping().field_for("MAERIA PRIMA"),
            Some("materia_prima")
        );
        assert_eq!(Sheet::Orders.mapping().header_for("estado"), Some("ESTADO"));
        assert_eq!(
            Sheet::Maintenance.mapping().header_for("estado"),
            Some("Estado")
        );
    }
}
