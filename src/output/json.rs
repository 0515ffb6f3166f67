use super::ListResult;

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(result: &ListResult) -> String {
        serde_json::to_string_pretty(&result.to_list_value()).unwrap_or_else(|_| "{}".to_string())
    }
}
