/// Instruction sent as the system message of every analysis request.
pub const SYSTEM_PROMPT: &str = "You are a data analyst. Analyze the provided CSV data and provide insights, trends, and actionable recommendations. Format your response in clean Markdown.";

/// Builds the user message that embeds the tabular data.
pub fn build_user_prompt(csv_data: &str) -> String {
    format!("Analyze this CSV data:\n\n{csv_data}")
}
