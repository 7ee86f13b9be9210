use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{result_payload, scalar_to_string};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result render as a field/value table; any field
/// holding an array of objects (an installment schedule, a payment
/// history) renders as its own table beneath, one row per element.
pub fn print_table(value: &Value) {
    let payload = result_payload(value);

    match payload {
        Value::Object(map) => {
            let scalars: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(_, v)| !is_object_array(v))
                .collect();

            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in &scalars {
                    builder.push_record([key.as_str(), &scalar_to_string(val)]);
                }
                println!("{}", Table::from(builder));
            }

            for (key, val) in map {
                if let Value::Array(rows) = val {
                    if is_object_array(val) {
                        println!("\n{}:", key);
                        print_rows(rows);
                    }
                }
            }
        }
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", payload),
    }

    print_footer(value);
}

fn is_object_array(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))))
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            println!("{}", scalar_to_string(row));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(scalar_to_string).unwrap_or_default()),
            );
        }
    }

    println!("{}", Table::from(builder));
}

fn print_footer(value: &Value) {
    let Some(envelope) = value.as_object() else {
        return;
    };

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}
