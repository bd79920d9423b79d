use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tiberius::{ColumnData, FromSql, Row};

use super::client::MssqlClient;
use super::params::bind_query;
use crate::error::FluentSqlError;
use crate::params::Parameters;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Run `sql` and collect every result set it produces, in order.
pub(crate) async fn query_result_sets(
    client: &mut MssqlClient,
    sql: &str,
    params: &Parameters,
) -> Result<Vec<ResultSet>, FluentSqlError> {
    let stream = bind_query(sql, params).query(client).await?;
    let sets = stream.into_results().await?;
    sets.into_iter().map(build_result_set).collect()
}

/// Run `sql` and return the total number of affected rows.
pub(crate) async fn execute(
    client: &mut MssqlClient,
    sql: &str,
    params: &Parameters,
) -> Result<usize, FluentSqlError> {
    let result = bind_query(sql, params).execute(client).await?;
    convert_affected_rows(result.rows_affected().iter().sum())
}

pub(crate) fn convert_affected_rows(rows_affected: u64) -> Result<usize, FluentSqlError> {
    usize::try_from(rows_affected).map_err(|e| {
        FluentSqlError::ExecutionError(format!("Invalid rows affected count: {e}"))
    })
}

/// Build a result set from the rows of one SQL Server result.
pub(crate) fn build_result_set(rows: Vec<Row>) -> Result<ResultSet, FluentSqlError> {
    let Some(first) = rows.first() else {
        return Ok(ResultSet::default());
    };
    let column_names: Vec<String> = first
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));
    for row in rows {
        let values = row
            .into_iter()
            .map(|data| extract_value(&data))
            .collect::<Result<Vec<_>, _>>()?;
        result_set.add_row_values(values);
    }
    Ok(result_set)
}

/// Convert one column value, mapping SQL NULL of any type to `RowValues::Null`.
fn extract_value(data: &ColumnData<'static>) -> Result<RowValues, FluentSqlError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| RowValues::Text(s.to_string())),
        ColumnData::Guid(v) => v.as_ref().map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| RowValues::Blob(b.to_vec())),
        ColumnData::Numeric(v) => v.as_ref().map(|n| {
            #[allow(clippy::cast_precision_loss)]
            let scaled = n.value() as f64 / 10f64.powi(i32::from(n.scale()));
            RowValues::Float(scaled)
        }),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|xml| RowValues::Text(xml.clone().into_owned().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)?.map(RowValues::Timestamp)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(data)?
            .map(|d| RowValues::Timestamp(d.and_time(NaiveTime::MIN))),
        ColumnData::Time(_) => NaiveTime::from_sql(data)?.map(|t| RowValues::Text(t.to_string())),
        ColumnData::DateTimeOffset(_) => {
            DateTime::<Utc>::from_sql(data)?.map(|dt| RowValues::Timestamp(dt.naive_utc()))
        }
        #[allow(unreachable_patterns)]
        _ => None,
    };
    Ok(value.unwrap_or(RowValues::Null))
}
