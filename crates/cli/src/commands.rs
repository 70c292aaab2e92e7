use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the node tree of an expression
    Parse {
        #[arg(long, help = "Expression text")]
        expr: String,

        #[arg(long, help = "Keep unknown function names as custom functions")]
        accept_custom_funcs: bool,
    },
    /// Parse and render back to SQL text
    Unparse {
        #[arg(long, help = "Expression text", conflicts_with = "select")]
        expr: Option<String>,

        #[arg(long, help = "SELECT statement text")]
        select: Option<String>,
    },
    /// Type-check an expression against a schema document
    Check {
        #[arg(long, help = "Expression text")]
        expr: String,

        #[arg(long, help = "Schema JSON file path")]
        schema: String,
    },
    /// Evaluate an expression for every record of a JSON array
    Eval {
        #[arg(long, help = "Expression text")]
        expr: String,

        #[arg(long, help = "Schema JSON file path")]
        schema: String,

        #[arg(
            long,
            help = "JSON file holding an array of records keyed by field name"
        )]
        records: String,
    },
    /// Resolve a SELECT statement and print its plan as JSON
    Select {
        #[arg(long, help = "SELECT statement text")]
        sql: String,

        #[arg(long, help = "Schema JSON file path listing every known table")]
        schema: String,
    },
    /// Apply the BETWEEN and NOT rewrites and print the result
    Rewrite {
        #[arg(long, help = "Expression text")]
        expr: String,
    },
    /// Area of a hex-encoded WKB polygon or multipolygon
    Area {
        #[arg(long, help = "Hex-encoded WKB")]
        hex: String,
    },
}
