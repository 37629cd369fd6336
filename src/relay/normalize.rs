use serde::Serialize;
use serde_json::{Map, Value};

/// One network service the provider saw on the host.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ServiceBanner {
    pub port: Option<u16>,
    pub transport: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub banner: Option<String>,
    pub http: Option<Value>,
}

/// Simplified view of a provider host document. Every field is best-effort;
/// `raw` carries the untouched payload.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NormalizedHostRecord {
    pub found: bool,
    pub ip: Option<String>,
    pub org: Option<String>,
    pub isp: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_update: Option<String>,
    pub ports: Vec<u16>,
    pub hostnames: Vec<String>,
    pub os: Option<String>,
    pub services: Vec<ServiceBanner>,
    pub vulns: Vec<Value>,
    pub raw: Value,
}

impl NormalizedHostRecord {
    pub fn from_payload(raw: Value) -> Self {
        let empty = Map::new();
        let doc = raw.as_object().unwrap_or(&empty);

        Self {
            found: true,
            ip: text(doc, &["ip_str"]),
            org: text(doc, &["org"]),
            isp: text(doc, &["isp"]),
            country: text(doc, &["country_name", "country"]),
            city: text(doc, &["city"]),
            latitude: doc.get("latitude").and_then(Value::as_f64),
            longitude: doc.get("longitude").and_then(Value::as_f64),
            last_update: text(doc, &["last_update", "timestamp"]),
            ports: ports(doc.get("ports")),
            hostnames: strings(doc.get("hostnames")),
            os: text(doc, &["os"]),
            services: services(doc.get("data")),
            vulns: vulns(doc.get("vulns")),
            raw,
        }
    }
}

/// First non-empty string among `keys`.
fn text(doc: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| doc.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

fn port(value: &Value) -> Option<u16> {
    value.as_u64().and_then(|port| u16::try_from(port).ok())
}

fn ports(value: Option<&Value>) -> Vec<u16> {
    match value.and_then(Value::as_array) {
        Some(items) => items.iter().filter_map(port).collect(),
        None => Vec::new(),
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        None => Vec::new(),
    }
}

fn services(value: Option<&Value>) -> Vec<ServiceBanner> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let empty = Map::new();
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_object().unwrap_or(&empty);
            ServiceBanner {
                port: entry.get("port").and_then(port),
                transport: text(entry, &["transport"]),
                product: text(entry, &["product"]),
                version: text(entry, &["version"]),
                banner: text(entry, &["data", "banner"]),
                http: entry.get("http").filter(|http| !http.is_null()).cloned(),
            }
        })
        .collect()
}

fn vulns(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Object(map)) => map.keys().cloned().map(Value::String).collect(),
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
