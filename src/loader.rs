//! Reads users, stores and ratings from CSV, Parquet or Arrow files.

use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::dataset::{Dataset, STORE_FIELDS, USER_FIELDS};
use crate::domain::StoreError;
use crate::rating::{Rating, parse_timestamp};
use crate::record::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// One loaded column, nulls kept as `None`.
struct LoadedColumn {
    name: String,
    values: Vec<Option<Value>>,
}

const EXTENSIONS: [&str; 6] = ["csv", "parquet", "pq", "arrow", "ipc", "feather"];

fn detect_file_type(path: &Path) -> Result<FileType, StoreError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(StoreError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, StoreError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StoreError::FileNotFound,
        ErrorKind::PermissionDenied => StoreError::PermissionDenied,
        _ => StoreError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(StoreError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<LoadedColumn, PolarsError> {
    let column = df.column(col_name)?;
    let values = if is_numeric_type(column.dtype()) {
        let col = column.cast(&DataType::Float64)?;
        col.f64()?.into_iter().map(|v| v.map(Value::Number)).collect()
    } else {
        let col = column.cast(&DataType::String)?;
        col.str()?
            .into_iter()
            .map(|v| v.map(|s| Value::text(s.replace("\r\n", " ").replace('\n', " "))))
            .collect()
    };
    Ok(LoadedColumn {
        name: col_name.to_string(),
        values,
    })
}

/// Load every column of a file. Columns are converted in parallel, one per task.
fn load_file(path: PathBuf) -> Result<Vec<LoadedColumn>, StoreError> {
    let file_info = get_file_info(path)?;
    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let columns: Result<Vec<LoadedColumn>, PolarsError> =
        names.par_iter().map(|name| load_column(&df, name)).collect();
    let columns = columns?;

    info!(
        "Loaded {:?} ({} bytes, {} rows) in {}ms",
        file_info.path,
        file_info.file_size,
        df.height(),
        start_time.elapsed().as_millis()
    );
    Ok(columns)
}

/// Turn columns into per-row field lists, rejecting columns outside `fields`.
fn into_rows(
    columns: Vec<LoadedColumn>,
    fields: &[&str],
    categories: &[&str],
) -> Result<Vec<Vec<(String, Value)>>, StoreError> {
    if let Some(unknown) = columns.iter().find(|c| !fields.contains(&c.name.as_str())) {
        return Err(StoreError::UnknownField {
            field: unknown.name.clone(),
        });
    }
    let nrows = columns.first().map(|c| c.values.len()).unwrap_or(0);
    let mut rows: Vec<Vec<(String, Value)>> = vec![Vec::with_capacity(columns.len()); nrows];
    for column in columns {
        let is_category = categories.contains(&column.name.as_str());
        for (row, value) in rows.iter_mut().zip(column.values) {
            if let Some(value) = value {
                let value = match value {
                    Value::Text(s) if is_category => Value::Category(s),
                    v => v,
                };
                row.push((column.name.clone(), value));
            }
        }
    }
    trace!("Converted {} rows", rows.len());
    Ok(rows)
}

fn field<'a>(row: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    row.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

fn required<'a>(row: &'a [(String, Value)], name: &str) -> Result<&'a Value, StoreError> {
    field(row, name).ok_or_else(|| StoreError::MissingColumn {
        column: name.to_string(),
    })
}

/// Whole numbers only; `4.7` is rejected rather than truncated.
fn rating_value(value: &Value) -> Result<i64, StoreError> {
    match value {
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Ok(*n as i64),
        Value::Number(n) => Err(StoreError::MalformedRating(n.to_string())),
        other => {
            let raw = other.to_string();
            raw.trim()
                .parse::<i64>()
                .map_err(|_| StoreError::MalformedRating(raw.clone()))
        }
    }
}

/// Ratings files carry `id, userId, storeId, rating, date` and an optional `comment`.
fn into_ratings(columns: Vec<LoadedColumn>) -> Result<Vec<Rating>, StoreError> {
    let fields = ["id", "userId", "storeId", "rating", "date", "comment"];
    for name in ["userId", "storeId", "rating", "date"] {
        if !columns.iter().any(|c| c.name == name) {
            return Err(StoreError::MissingColumn {
                column: name.to_string(),
            });
        }
    }
    let rows = into_rows(columns, &fields, &[])?;
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let value = rating_value(required(row, "rating")?)?;
            let id = field(row, "id")
                .map(|v| v.to_string())
                .unwrap_or_else(|| (idx + 1).to_string());
            Rating::new(
                id,
                value,
                required(row, "storeId")?.to_string(),
                required(row, "userId")?.to_string(),
                parse_timestamp(&required(row, "date")?.to_string())?,
                field(row, "comment").map(|v| v.to_string()),
            )
        })
        .collect()
}

/// Find `<stem>.<ext>` in `dir` for the first supported extension that exists.
fn find_file(dir: &Path, stem: &str) -> Result<PathBuf, StoreError> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| StoreError::LoadingFailed(format!("no {stem} file in {}", dir.display())))
}

/// Load `users`, `stores` and `ratings` files from one directory.
pub fn load_dataset(dir: &Path) -> Result<Dataset, StoreError> {
    debug!("Loading dataset from {}", dir.display());
    let users = into_rows(load_file(find_file(dir, "users")?)?, &USER_FIELDS, &["role"])?;
    let stores = into_rows(load_file(find_file(dir, "stores")?)?, &STORE_FIELDS, &[])?;
    let ratings = into_ratings(load_file(find_file(dir, "ratings")?)?)?;
    Dataset::new(users, stores, ratings)
}
