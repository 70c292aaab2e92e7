use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use expression_engine::{
    Check, CheckOptions, CustomFunctionRegistrar, EvalContext, Evaluator, SpatialFunctions,
};
use model::{FieldList, ParseOptions, schema::document::SchemaDocument};
use sql_syntax::{parse_expression, parse_select};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wkb::{FlatType, multipolygon_area, polygon_area, read_geometry_type};

mod commands;
mod error;
mod records;

#[derive(Parser)]
#[command(name = "swq", version = "0.1.0", about = "OGR SQL expression toolkit")]
struct Cli {
    #[arg(long, global = true, help = "Parse options JSON file path")]
    options: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = load_options(cli.options.as_deref())?;
    let output = run(cli.command, &options)?;
    println!("{output}");
    Ok(())
}

fn load_options(path: Option<&str>) -> Result<ParseOptions, CliError> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            Ok(ParseOptions::from_json(&source)?)
        }
        None => Ok(ParseOptions::default()),
    }
}

fn load_schema(path: &str) -> Result<FieldList, CliError> {
    let source = std::fs::read_to_string(path)?;
    Ok(SchemaDocument::from_json(&source)?.into_field_list()?)
}

/// Spatial functions are only offered when custom functions are accepted.
fn custom_functions(options: &ParseOptions) -> Option<&'static dyn CustomFunctionRegistrar> {
    static SPATIAL: SpatialFunctions = SpatialFunctions;
    options
        .accept_custom_funcs
        .then_some(&SPATIAL as &dyn CustomFunctionRegistrar)
}

fn check_options(options: &ParseOptions) -> CheckOptions<'static> {
    CheckOptions {
        allow_secondary_table_fields: false,
        allow_mismatched_comparison_types: options.allow_mismatched_comparison_types,
        custom_functions: custom_functions(options),
    }
}

/// Runs one command and returns what it prints.
fn run(command: Commands, options: &ParseOptions) -> Result<String, CliError> {
    match command {
        Commands::Parse {
            expr,
            accept_custom_funcs,
        } => {
            let options = ParseOptions {
                accept_custom_funcs: accept_custom_funcs || options.accept_custom_funcs,
                ..options.clone()
            };
            Ok(parse_expression(&expr, &options)?.dump())
        }
        Commands::Unparse { expr, select } => match (expr, select) {
            (Some(expr), _) => {
                Ok(parse_expression(&expr, options)?.unparse(None, options.column_quote))
            }
            (None, Some(select)) => Ok(parse_select(&select, options)?.unparse()),
            (None, None) => Err(CliError::MissingInput),
        },
        Commands::Check { expr, schema } => {
            let schema = load_schema(&schema)?;
            let mut node = parse_expression(&expr, options)?;
            let field_type = node.check(&schema, &check_options(options))?;
            Ok(field_type.name().to_string())
        }
        Commands::Eval {
            expr,
            schema,
            records,
        } => {
            let schema = load_schema(&schema)?;
            let mut node = parse_expression(&expr, options)?;
            node.check(&schema, &check_options(options))?;

            let source = std::fs::read_to_string(&records)?;
            let records = records::load_records(&source, &schema)?;
            info!("Evaluating expression over {} records", records.len());

            let mut ctx = EvalContext::new(options);
            ctx.custom_functions = custom_functions(options);
            let mut lines = Vec::with_capacity(records.len());
            for record in &records {
                let value = node.evaluate(&records::fetch, record.as_slice(), &ctx)?;
                lines.push(records::to_json(&value).to_string());
            }
            Ok(lines.join("\n"))
        }
        Commands::Select { sql, schema } => {
            let catalog = load_schema(&schema)?;
            let (_, plan) =
                planner::plan_select(&sql, &catalog, options, custom_functions(options))?;
            debug!("Planned select over {} tables", plan.tables.len());
            Ok(plan.to_json()?)
        }
        Commands::Rewrite { expr } => {
            let mut node = parse_expression(&expr, options)?;
            node.replace_between_by_ge_and_le();
            let node = node.push_not_operation_down_to_stack();
            Ok(node.unparse(None, options.column_quote))
        }
        Commands::Area { hex } => {
            let bytes = decode_hex(&hex)?;
            let (_, geometry_type) = read_geometry_type(&bytes)?;
            let mut cursor = bytes.as_slice();
            let area = match geometry_type.flat {
                FlatType::Polygon => polygon_area(&mut cursor)?,
                FlatType::MultiPolygon => multipolygon_area(&mut cursor)?,
                _ => return Err(CliError::NotPolygonal(geometry_type.to_string())),
            };
            Ok(area.to_string())
        }
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let text = text.trim();
    if text.len() % 2 != 0 || !text.is_ascii() {
        return Err(CliError::InvalidHex(text.to_string()));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .map_err(|_| CliError::InvalidHex(text.to_string()))
        })
        .collect()
}
