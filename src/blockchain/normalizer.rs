// src/blockchain/normalizer.rs

//! Rewrites the hex quantities returned by Ethereum nodes into decimal values.
//!
//! Plain counters (block numbers, gas, nonces, timestamps) become JSON numbers. Currency values
//! become a `{ "wei": "...", "ether": "..." }` pair of decimal strings so nothing above 2^53 is
//! ever squeezed through a float. Fields the normalizer does not know about are copied as-is.

use ethers_core::types::U256;
use serde_json::{json, Number, Value};

const WEI_DECIMALS: usize = 18;

fn strip_hex_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
}

/// Returns the digits to parse, or `None` when the input is missing, empty, `"0x"` or not
/// plain hex. Every caller maps `None` to zero.
fn hex_digits(hex: Option<&str>) -> Option<&str> {
    let digits = strip_hex_prefix(hex?);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(digits)
}

fn parse_u256(hex: Option<&str>) -> Option<U256> {
    hex_digits(hex).and_then(|digits| U256::from_str_radix(digits, 16).ok())
}

/// Hex quantity to a JSON number. Values that fit in a `u64` are exact; wider values fall back
/// to an approximate float. Anything unparseable yields 0.
pub fn hex_to_decimal(hex: Option<&str>) -> Number {
    let Some(digits) = hex_digits(hex) else {
        return Number::from(0u64);
    };
    if let Ok(value) = u64::from_str_radix(digits, 16) {
        return Number::from(value);
    }
    parse_u256(Some(digits))
        .and_then(|value| value.to_string().parse::<f64>().ok())
        .and_then(Number::from_f64)
        .unwrap_or_else(|| Number::from(0u64))
}

/// Hex quantity to a base-10 string without going through a fixed-width integer.
pub fn hex_to_decimal_string(hex: Option<&str>) -> String {
    parse_u256(hex)
        .map(|value| value.to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// Wei amount (hex) to ether, rendered exactly with no trailing zeros.
pub fn wei_to_ether(wei_hex: Option<&str>) -> String {
    let Some(wei) = parse_u256(wei_hex) else {
        return "0".to_string();
    };
    let (whole, fraction) = wei.div_mod(U256::exp10(WEI_DECIMALS));
    if fraction.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = WEI_DECIMALS);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// JSON truthiness: present and not `null`, `false`, `0` or `""`.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn decimal(value: Option<&Value>) -> Value {
    Value::Number(hex_to_decimal(value.and_then(Value::as_str)))
}

fn currency(value: Option<&Value>) -> Value {
    let hex = value.and_then(Value::as_str);
    json!({
        "wei": hex_to_decimal_string(hex),
        "ether": wei_to_ether(hex),
    })
}

fn decimal_or_null(value: Option<&Value>) -> Value {
    if is_truthy(value) {
        decimal(value)
    } else {
        Value::Null
    }
}

/// Applies the per-field policy for transactions and receipts.
///
/// blockNumber, transactionIndex and gasPrice become `null` when falsy; gas and nonce are
/// always converted; value is always a wei/ether pair; gasUsed, cumulativeGasUsed and
/// effectiveGasPrice are dropped when falsy.
pub fn transform_transaction(tx: Value) -> Value {
    let Value::Object(source) = tx else {
        return tx;
    };

    let mut out = source.clone();
    out.insert("blockNumber".into(), decimal_or_null(source.get("blockNumber")));
    out.insert(
        "transactionIndex".into(),
        decimal_or_null(source.get("transactionIndex")),
    );
    out.insert("gas".into(), decimal(source.get("gas")));
    out.insert("gasPrice".into(), decimal_or_null(source.get("gasPrice")));
    out.insert("nonce".into(), decimal(source.get("nonce")));
    out.insert("value".into(), currency(source.get("value")));

    for key in ["gasUsed", "cumulativeGasUsed", "effectiveGasPrice"] {
        if is_truthy(source.get(key)) {
            out.insert(key.into(), decimal(source.get(key)));
        } else {
            out.remove(key);
        }
    }

    Value::Object(out)
}

fn transform_block(block: Value) -> Value {
    let Value::Object(mut out) = block else {
        return block;
    };

    for key in ["number", "gasLimit", "gasUsed", "timestamp"] {
        if is_truthy(out.get(key)) {
            let converted = decimal(out.get(key));
            out.insert(key.into(), converted);
        }
    }

    // full transaction objects are normalized, bare hashes are left alone
    if let Some(Value::Array(txs)) = out.get_mut("transactions") {
        for tx in txs.iter_mut().filter(|tx| tx.is_object()) {
            *tx = transform_transaction(tx.take());
        }
    }

    Value::Object(out)
}

/// Reshapes the raw `result` of `method` for downstream consumers. Methods without a rule are
/// returned unchanged.
pub fn normalize_response(method: &str, result: Value) -> Value {
    match method {
        "eth_blockNumber" | "eth_gasPrice" | "eth_estimateGas" => match &result {
            Value::String(_) | Value::Null => decimal(Some(&result)),
            _ => result,
        },
        "eth_getBalance" => match &result {
            Value::String(_) => currency(Some(&result)),
            _ => result,
        },
        "eth_getBlockByNumber" | "eth_getBlockByHash" => transform_block(result),
        "eth_getTransactionByHash" | "eth_getTransactionReceipt" => transform_transaction(result),
        _ => result,
    }
}
