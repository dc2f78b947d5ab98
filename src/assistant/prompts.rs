//! Prompt text sent to the model. Spanish, like the data it talks about.

use serde_json::{json, Value};

use crate::types::ProductionOrder;

fn text(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

fn number(field: Option<f64>) -> String {
    match field {
        Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
        Some(n) => n.to_string(),
        None => String::new(),
    }
}

pub fn priority(order: &ProductionOrder) -> String {
    let current = order
        .prioridad
        .map(|p| p.to_string())
        .unwrap_or_default();
    format!(
        "Analiza la siguiente orden de producción y sugiere una prioridad (Baja, Media, Alta).\n\
         Devuelve la respuesta en formato JSON con las claves \"prioridad\" y \"justificacion\".\n\
         \n\
         - Producto: {}\n\
         - Cliente: {}\n\
         - Cantidad: {}\n\
         - Fecha de Emisión: {}\n\
         - Estado Actual: {}\n\
         - Prioridad Actual: {}\n",
        text(&order.descripcion),
        text(&order.cliente),
        number(order.cantidad_unidades),
        text(&order.fecha_emision),
        text(&order.estado),
        current,
    )
}

/// Response schema for [`priority`]
pub fn priority_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "prioridad": { "type": "STRING" },
            "justificacion": { "type": "STRING" }
        },
        "required": ["prioridad", "justificacion"]
    })
}

pub fn client_email(order: &ProductionOrder) -> String {
    format!(
        "Redacta un correo electrónico corto y profesional para el cliente \"{}\" \n\
         informándole sobre el estado actual de su orden de producción #{}.\n\
         \n\
         Detalles de la orden:\n\
         - Producto: {}\n\
         - Cantidad: {}\n\
         - Estado Actual: {}\n\
         \n\
         Sé amable y conciso. No incluyas un asunto, solo el cuerpo del correo.\n",
        text(&order.cliente),
        text(&order.no_ot),
        text(&order.descripcion),
        number(order.cantidad_unidades),
        text(&order.estado),
    )
}

pub fn job_description(cargo: &str) -> String {
    format!(
        "Genera una descripción de responsabilidades breve (2-3 frases) para el cargo de \"{}\" \n\
         en una empresa de manufactura de productos de madera y metal.\n",
        cargo.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn order() -> ProductionOrder {
        ProductionOrder {
            no_ot: Some("880".into()),
            cliente: Some("Herrajes del Norte".into()),
            descripcion: Some("Escuadra 90°".into()),
            cantidad_unidades: Some(1500.0),
            fecha_emision: Some("02/05/2025".into()),
            estado: Some("Pendiente".into()),
            prioridad: Some(Priority::Media),
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_prompt_lists_order_facts() {
        let prompt = priority(&order());
        assert!(prompt.contains("- Producto: Escuadra 90°"));
        assert!(prompt.contains("- Cantidad: 1500\n"));
        assert!(prompt.contains("- Prioridad Actual: Media"));
        assert!(prompt.contains("\"justificacion\""));
    }

    #[test]
    fn test_priority_prompt_blank_fields() {
        let prompt = priority(&ProductionOrder::default());
        assert!(prompt.contains("- Cliente: \n"));
        assert!(prompt.contains("- Prioridad Actual: \n"));
    }

    #[test]
    fn test_email_prompt_names_client_and_order() {
        let prompt = client_email(&order());
        assert!(prompt.contains("\"Herrajes del Norte\""));
        assert!(prompt.contains("#880."));
        assert!(prompt.contains("No incluyas un asunto"));
    }

    #[test]
    fn test_job_description_prompt() {
        let prompt = job_description("  Operario de prensa ");
        assert!(prompt.contains("\"Operario de prensa\""));
        assert!(prompt.contains("madera y metal"));
    }

    #[test]
    fn test_schema_requires_both_keys() {
        let schema = priority_schema();
        assert_eq!(schema["required"][0], "prioridad");
        assert_eq!(schema["properties"]["justificacion"]["type"], "STRING");
    }
}
