use gmxflow::core::tables::DEFAULT_BLOB_NAME;
use gmxflow::engine::analysis::AnalysisKind;

pub struct DefaultsConfig {
    pub gmx: String,
    pub time_unit: String,
    pub blob_name: String,
    pub write_blob: bool,
    pub emit_loader: bool,
    pub analyses: Vec<AnalysisKind>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            gmx: "gmx".to_string(),
            time_unit: "ns".to_string(),
            blob_name: DEFAULT_BLOB_NAME.to_string(),
            write_blob: true,
            emit_loader: true,
            analyses: AnalysisKind::ALL.to_vec(),
        }
    }
}
