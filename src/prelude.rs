pub use datafusion::prelude::*;
pub use datafusion::error::{DataFusionError, Result as DataFusionResult};
pub use datafusion::dataframe::DataFrame;
pub use datafusion::datasource::MemTable;
pub use datafusion::prelude::SessionContext;

pub use datafusion::arrow::datatypes::{Field, DataType as ArrowDataType, Schema, SchemaRef};
pub use datafusion::arrow::record_batch::RecordBatch;
pub use datafusion::arrow::error::ArrowError;
pub use datafusion::arrow::util::pretty::pretty_format_batches;
pub use arrow::array::{
    Array, ArrayRef, StringArray, Int64Array, Float64Array, Date32Array,
};
pub use arrow::compute;
pub use arrow::csv::writer::WriterBuilder;

pub use chrono::{NaiveDate, Datelike, Local};

pub use regex::Regex;
pub use lazy_static::lazy_static;

pub use serde::{Deserialize, Serialize};

pub use tracing::{debug, error, info, warn};

// Standard Library Imports
pub use std::collections::{BTreeMap, HashMap};
pub use std::sync::Arc;
pub use std::fmt;
pub use std::error::Error;
pub use std::path::{Path, PathBuf};
pub use std::fs::{self, File, OpenOptions};
pub use std::io::{BufWriter, Write};

pub use crate::{AliasedDataFrame, CubeError, CubeResult};
pub use crate::config::pipeline_config::{NullDefaults, PipelineConfig};
pub use crate::datatypes::datatypes::{
    CatalogEntry, FactSalesRow, RegionEntry, SalesRecord, FACT_COLUMNS,
};

#[cfg(feature = "dashboard")]
pub use plotly::{Plot as PlotlyPlot, Bar, Layout};
#[cfg(feature = "dashboard")]
pub use plotly::common::{Marker, Orientation, TextPosition};
#[cfg(feature = "dashboard")]
pub use plotly::layout::Axis;
