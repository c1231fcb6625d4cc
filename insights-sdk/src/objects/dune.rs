//! Response objects of the Dune analytics query results API.

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DuneResponse<T> {
    pub result: Option<DuneResult<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuneResult<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
}

/// One row of the daily CEX movement query: FLIP moved into and out of
/// centralised exchanges on a given day of the current year.
#[derive(Debug, Clone, Deserialize)]
pub struct CexMovementRow {
    pub day_of_year: u32,
    #[serde(default)]
    pub flip_to_cex: Decimal,
    #[serde(default)]
    pub flip_from_cex: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cex_movement_rows() {
        let payload = r#"{
            "execution_id": "01HP",
            "result": {
                "rows": [
                    { "day_of_year": 34, "flip_to_cex": 1200.5, "flip_from_cex": 800 },
                    { "day_of_year": 33, "flip_to_cex": "10", "flip_from_cex": "12.25" }
                ],
                "metadata": {}
            }
        }"#;
        let response: DuneResponse<CexMovementRow> = serde_json::from_str(payload).unwrap();
        let rows = response.result.unwrap().rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].day_of_year, 33);
        assert_eq!(rows[1].flip_from_cex.to_string(), "12.25");
    }
}
