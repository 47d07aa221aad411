use crate::prelude::*;

lazy_static! {
    static ref MISSING_FIELD_PATTERN: Regex =
        Regex::new(r#"No field named (?:"?[A-Za-z_][A-Za-z0-9_]*"?\.)?"?([A-Za-z_][A-Za-z0-9_]*)"?"#)
            .expect("Failed to compile missing field regex");
    static ref VALID_FIELDS_PATTERN: Regex =
        Regex::new(r"Valid fields are (.+?)\.?$")
            .expect("Failed to compile valid fields regex");
}

#[derive(Debug)]
pub enum CubeError {
    MissingColumn {
        column: String,
        available_columns: Vec<String>,
    },
    SchemaError {
        message: String,
        schema: Option<String>,
        suggestion: String,
    },
    InvalidOperation {
        operation: String,
        reason: String,
        suggestion: String,
    },
    ReadError {
        path: String,
        reason: String,
        suggestion: String,
    },
    WriteError {
        path: String,
        operation: String,
        reason: String,
        suggestion: String,
    },
    EmptyFactTable {
        operation: String,
    },
    DataFusion(DataFusionError),
    Arrow(ArrowError),
    Csv(csv::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    Custom(String),
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeError::MissingColumn { column, available_columns } => {
                let suggestion = suggest_similar_column(column, available_columns);
                write!(
                    f,
                    "🔍 Column Not Found: '{}'\n\
                     📋 Available columns are: {}\n\
                     💡 Did you mean '{}'?\n\
                     🔧 A reference table may have failed to load, check the extraction log.",
                    column,
                    available_columns.join(", "),
                    suggestion
                )
            },
            CubeError::SchemaError { message, schema, suggestion } => {
                let schema_info = schema.as_ref().map_or(
                    String::new(),
                    |s| format!("\n📋 Current Schema:\n{}", s)
                );
                write!(
                    f,
                    "🏗️ Schema Error: {}{}\n\
                     💡 Suggestion: {}",
                    message, schema_info, suggestion
                )
            },
            CubeError::InvalidOperation { operation, reason, suggestion } => write!(
                f,
                "⚠️ Invalid Operation: {}\n\
                 ❌ Problem: {}\n\
                 💡 Suggestion: {}",
                operation, reason, suggestion
            ),
            CubeError::ReadError { path, reason, suggestion } => write!(
                f,
                "📂 Read Error\n\
                 📍 Path: {}\n\
                 ❌ Problem: {}\n\
                 💡 Suggestion: {}",
                path, reason, suggestion
            ),
            CubeError::WriteError { path, operation, reason, suggestion } => write!(
                f,
                "💾 Write Error during {} operation\n\
                 📍 Path: {}\n\
                 ❌ Problem: {}\n\
                 💡 Suggestion: {}",
                operation, path, reason, suggestion
            ),
            CubeError::EmptyFactTable { operation } => write!(
                f,
                "📭 Empty Fact Table: {} needs at least one transaction\n\
                 💡 Run the ETL stage first or check that the sales file has rows",
                operation
            ),
            CubeError::DataFusion(err) => write!(
                f,
                "⚡ DataFusion Error: {}\n\
                 💡 Check column names and types of the registered tables",
                err
            ),
            CubeError::Arrow(err) => write!(f, "🏹 Arrow Error: {}", err),
            CubeError::Csv(err) => write!(f, "📄 CSV Error: {}", err),
            CubeError::Json(err) => write!(
                f,
                "🧾 Configuration Error: {}\n\
                 💡 Make sure the configuration file is valid JSON",
                err
            ),
            CubeError::Io(err) => write!(
                f,
                "📁 I/O Error: {}\n\
                 💡 Check that the data directory exists and is writable",
                err
            ),
            CubeError::Custom(err) => write!(f, "💫 {}", err),
        }
    }
}

impl Error for CubeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CubeError::DataFusion(err) => Some(err),
            CubeError::Arrow(err) => Some(err),
            CubeError::Csv(err) => Some(err),
            CubeError::Json(err) => Some(err),
            CubeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DataFusionError> for CubeError {
    fn from(err: DataFusionError) -> Self {
        if let DataFusionError::SchemaError(schema_err, _context) = &err {
            let error_msg = schema_err.to_string();

            if let Some(column) = extract_missing_column(&error_msg) {
                return CubeError::MissingColumn {
                    column,
                    available_columns: extract_available_columns(&error_msg),
                };
            }

            return CubeError::SchemaError {
                message: error_msg,
                schema: None,
                suggestion: "💡 Check column names and data types of the source files".to_string(),
            };
        }

        CubeError::DataFusion(err)
    }
}

impl From<ArrowError> for CubeError {
    fn from(err: ArrowError) -> Self {
        CubeError::Arrow(err)
    }
}

impl From<csv::Error> for CubeError {
    fn from(err: csv::Error) -> Self {
        CubeError::Csv(err)
    }
}

impl From<serde_json::Error> for CubeError {
    fn from(err: serde_json::Error) -> Self {
        CubeError::Json(err)
    }
}

impl From<std::io::Error> for CubeError {
    fn from(err: std::io::Error) -> Self {
        CubeError::Io(err)
    }
}

pub type CubeResult<T> = Result<T, CubeError>;

/// Pulls the unqualified column name out of a DataFusion "No field named" message.
pub fn extract_missing_column(error: &str) -> Option<String> {
    MISSING_FIELD_PATTERN
        .captures(error)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn extract_available_columns(error: &str) -> Vec<String> {
    let Some(list) = VALID_FIELDS_PATTERN
        .captures(error)
        .and_then(|cap| cap.get(1))
    else {
        return Vec::new();
    };

    list.as_str()
        .split(',')
        .map(|field| {
            let field = field.trim().trim_matches('"');
            // drop the relation qualifier, "t"."col" -> col
            field.rsplit('.').next().unwrap_or(field).trim_matches('"').to_string()
        })
        .filter(|field| !field.is_empty())
        .collect()
}

fn suggest_similar_column(target: &str, available: &[String]) -> String {
    available
        .iter()
        .map(|col| (col, string_similarity(target, col)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(col, _)| col.clone())
        .unwrap_or_default()
}

fn string_similarity(s1: &str, s2: &str) -> f64 {
    let s1_lower = s1.to_lowercase();
    let s2_lower = s2.to_lowercase();

    if s1_lower.starts_with(&s2_lower) || s2_lower.starts_with(&s1_lower) {
        return 0.9;
    }

    let common_len = s1_lower.chars()
        .zip(s2_lower.chars())
        .take_while(|(c1, c2)| c1 == c2)
        .count() as f64;

    if common_len > 0.0 {
        return common_len / s1_lower.len().max(s2_lower.len()) as f64;
    }

    let max_len = s1_lower.len().max(s2_lower.len()) as f64;
    if max_len == 0.0 {
        return 0.0;
    }
    let common_chars = s1_lower.chars()
        .filter(|c| s2_lower.contains(*c))
        .count() as f64;

    common_chars / max_len
}
