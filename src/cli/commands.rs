use crate::assistant::Assistant;
use crate::client::{search_products as filter_products, PlantClient};
use crate::dates::{elapsed_for, format_duration};
use crate::error::{PlantError, PlantResult};
use crate::gateway::WriteOutcome;
use crate::mapping::{unknown_fields, Sheet};
use crate::types::{KpiData, ProductionOrder, Record};
use chrono::{Duration, Local};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;

/// Format a number for display, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> PlantResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse `field=value` arguments into a record. Values stay text; the sheet
/// stores whatever it is given.
pub fn parse_fields(pairs: &[String]) -> PlantResult<Record> {
    let mut record = Record::new();
    for pair in pairs {
        let (field, value) = pair.split_once('=').ok_or_else(|| {
            PlantError::Validation(format!("Expected field=value, got '{}'", pair))
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(PlantError::Validation(format!(
                "Missing field name in '{}'",
                pair
            )));
        }
        record.insert(field.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(record)
}

pub fn render_records(sheet: Sheet, records: &[Record]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({} rows)",
        "📋 Sheet:".bold().cyan(),
        sheet.name().bright_blue().bold(),
        records.len()
    );
    if records.is_empty() {
        let _ = writeln!(out, "   (empty)");
        return out;
    }
    let width = sheet.mapping().fields().map(str::len).max().unwrap_or(0);
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "\n   {}", format!("#{}", i + 1).bold());
        for (field, value) in record {
            let _ = writeln!(out, "      {:width$}  {}", field.cyan(), cell(value), width = width);
        }
    }
    out
}

pub fn render_kpis(kpi: &KpiData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "📊 Production KPIs".bold().green());
    let _ = writeln!(out, "   Total orders:     {}", kpi.total_ordenes.to_string().bold());
    let _ = writeln!(
        out,
        "   Completed:        {}",
        kpi.ordenes_completadas.to_string().bold()
    );
    let _ = writeln!(
        out,
        "   Completion rate:  {}%",
        format!("{:.1}", kpi.porcentaje_completadas).bold()
    );
    out
}

pub fn render_order(order: &ProductionOrder, elapsed: Option<Duration>) -> String {
    let mut out = String::new();
    let title = format!(
        "🏭 Orden {}",
        order.no_ot.as_deref().unwrap_or("(sin número)")
    );
    let _ = writeln!(out, "{}", title.bold().green());

    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let num = |v: Option<f64>| v.map(format_number).unwrap_or_default();
    let lines = [
        ("Cliente", text(&order.cliente)),
        ("Descripción", text(&order.descripcion)),
        ("Referencia", text(&order.referencia)),
        ("Orden de compra", text(&order.no_orden_compra)),
        ("Cantidad", num(order.cantidad_unidades)),
        ("Fecha de emisión", text(&order.fecha_emision)),
        ("Tiempo estimado (días)", num(order.tiempo_estimado_dias)),
        (
            "Material disponible",
            order
                .material_disponible
                .map(|m| m.to_string())
                .unwrap_or_default(),
        ),
        ("Material", text(&order.material)),
        (
            "Prioridad",
            order.prioridad.map(|p| p.to_string()).unwrap_or_default(),
        ),
        ("Estado", text(&order.estado)),
        ("Observación", text(&order.observacion)),
    ];
    for (label, value) in lines {
        if !value.is_empty() {
            let _ = writeln!(out, "   {:24}{}", format!("{}:", label).cyan(), value);
        }
    }
    if let Some(elapsed) = elapsed {
        let _ = writeln!(
            out,
            "   {:24}{}",
            "Tiempo transcurrido:".cyan(),
            format_duration(elapsed).bright_yellow().bold()
        );
    }
    out
}

fn report_outcome(outcome: WriteOutcome) {
    match outcome {
        WriteOutcome::Confirmed => println!("{}", "✅ Saved".bold().green()),
        WriteOutcome::Assumed => {
            println!("{}", "⚠️  Request sent (opaque write mode)".yellow());
            println!(
                "{}",
                "   The endpoint's answer was not read; refresh to confirm the row exists."
                    .yellow()
            );
        }
    }
}

/// Execute the list command
pub async fn list(client: &PlantClient, sheet: Sheet, json: bool) -> PlantResult<()> {
    let records = client.fetch_records(sheet).await?;
    if json {
        return print_json(&records);
    }
    print!("{}", render_records(sheet, &records));
    Ok(())
}

/// Execute the create command
pub async fn create(client: &PlantClient, sheet: Sheet, fields: &[String]) -> PlantResult<()> {
    let record = parse_fields(fields)?;
    if record.is_empty() {
        return Err(PlantError::Validation(
            "Nothing to save: pass at least one --field".to_string(),
        ));
    }
    for field in unknown_fields(sheet, &record) {
        println!(
            "{} '{}' has no column in {}; it will not be saved",
            "⚠️ ".yellow(),
            field,
            sheet.name()
        );
    }

    println!("{} {}", "➕ Creating row in".bold().green(), sheet.name().bright_blue());
    let outcome = client.create_record(sheet, &record).await?;
    report_outcome(outcome);
    Ok(())
}

/// Execute the update-product command
pub async fn update_product(client: &PlantClient, codigo: &str, fields: &[String]) -> PlantResult<()> {
    let changes = parse_fields(fields)?;
    for field in unknown_fields(Sheet::Products, &changes) {
        println!("{} '{}' is not a product field; ignored", "⚠️ ".yellow(), field);
    }

    println!("{} {}", "✏️  Updating product".bold().green(), codigo.bright_blue());
    let outcome = client.update_product(codigo, &changes).await?;
    report_outcome(outcome);
    Ok(())
}

/// Execute the search-products command
pub async fn search_products(client: &PlantClient, term: &str, json: bool) -> PlantResult<()> {
    let products = client.fetch_products().await?;
    let found = filter_products(&products, term);
    if json {
        return print_json(&found);
    }

    println!(
        "{} '{}' ({} of {})",
        "🔎 Products matching".bold().cyan(),
        term,
        found.len(),
        products.len()
    );
    for product in found {
        println!(
            "   {}  {}",
            product.codigo.as_deref().unwrap_or("-").bright_blue(),
            product.producto.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Execute the kpi command
pub async fn kpi(client: &PlantClient, json: bool) -> PlantResult<()> {
    let kpis = client.fetch_kpis().await?;
    if json {
        return print_json(&kpis);
    }
    print!("{}", render_kpis(&kpis));
    Ok(())
}

/// Execute the order command: details plus elapsed time for open orders
pub async fn order_detail(client: &PlantClient, no_ot: &str, json: bool) -> PlantResult<()> {
    let order = client.find_order(no_ot).await?;
    let elapsed = elapsed_for(&order, Local::now().naive_local());
    if json {
        #[derive(Serialize)]
        struct Detail<'a> {
            orden: &'a ProductionOrder,
            tiempo_transcurrido: Option<String>,
        }
        return print_json(&Detail {
            orden: &order,
            tiempo_transcurrido: elapsed.map(format_duration),
        });
    }
    print!("{}", render_order(&order, elapsed));
    Ok(())
}

/// Execute the suggest-priority command
pub async fn suggest_priority(
    client: &PlantClient,
    assistant: &Assistant,
    no_ot: &str,
    json: bool,
) -> PlantResult<()> {
    let order = client.find_order(no_ot).await?;
    let suggestion = assistant.suggest_priority(&order).await?;
    if json {
        return print_json(&suggestion);
    }
    println!("{}", "🤖 Suggested priority".bold().green());
    println!("   {}", suggestion.prioridad.bright_yellow().bold());
    println!("   {}", suggestion.justificacion);
    Ok(())
}

/// Execute the draft-email command
pub async fn draft_email(client: &PlantClient, assistant: &Assistant, no_ot: &str) -> PlantResult<()> {
    let order = client.find_order(no_ot).await?;
    let email = assistant.draft_client_email(&order).await?;
    println!("{}", "✉️  Draft email".bold().green());
    println!("{}", email.trim());
    Ok(())
}

/// Execute the job-description command
pub async fn job_description(assistant: &Assistant, cargo: &str) -> PlantResult<()> {
    let text = assistant.generate_job_description(cargo).await?;
    println!("{} {}", "🧑‍🏭 Cargo:".bold().green(), cargo.bright_blue());
    println!("{}", text.trim());
    Ok(())
}

/// Execute the headers command: show a sheet's column mapping
pub fn headers(sheet: Sheet) -> PlantResult<()> {
    println!(
        "{} {} ({})",
        "🗂  Columns of".bold().cyan(),
        sheet.name().bright_blue().bold(),
        sheet.alias()
    );
    let mapping = sheet.mapping();
    let width = mapping.headers().map(|h| h.chars().count()).max().unwrap_or(0);
    for (header, field) in mapping.pairs() {
        let pad = width.saturating_sub(header.chars().count());
        println!("   {}{}  →  {}", header, " ".repeat(pad), field.cyan());
    }
    Ok(())
}
