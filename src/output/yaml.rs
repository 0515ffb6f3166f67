use super::ListResult;

pub struct YamlFormatter;

impl YamlFormatter {
    pub fn format(result: &ListResult) -> String {
        serde_yaml::to_string(&result.to_list_value()).unwrap_or_else(|_| "{}".to_string())
    }
}
