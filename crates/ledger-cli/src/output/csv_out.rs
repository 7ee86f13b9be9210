use serde_json::Value;
use std::io;

use super::{result_payload, scalar_to_string};

/// Write output as CSV to stdout.
///
/// When the result carries an array of objects (installments, payment
/// history) that array becomes the CSV body; otherwise the result's
/// fields are emitted as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let payload = result_payload(value);

    match payload {
        Value::Object(map) => {
            let rows = map.values().find_map(|v| match v {
                Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))) => Some(arr),
                _ => None,
            });

            if let Some(rows) = rows {
                write_rows(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &scalar_to_string(val)]);
                }
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => {
            let _ = wtr.write_record([&scalar_to_string(payload)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            let _ = wtr.write_record([&scalar_to_string(row)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(scalar_to_string).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
