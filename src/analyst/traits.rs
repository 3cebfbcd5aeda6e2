use crate::model::AnalystError;

#[async_trait::async_trait]
pub trait ChartAnalyst: Send + Sync {
    /// Submits the rendered chart for `ticker` and returns the model's raw
    /// reply text, to be parsed downstream.
    async fn analyze_chart(
        &self,
        ticker: &str,
        chart_png: &[u8],
    ) -> Result<String, AnalystError>;
}
