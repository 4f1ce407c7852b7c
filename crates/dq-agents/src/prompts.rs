//! Prompt templates for the three agents
//!
//! Only column names are sent for SQL synthesis; insight and chart
//! prompts are grounded on the textual rendering of a query result, never
//! on raw dataset rows.

use dq_data::table::BOUND_TABLE;

/// Prompt asking the agent to turn a question into a single SQL statement
pub fn sql_prompt(question: &str, columns: &[String]) -> String {
    format!(
        "You are a helpful data analyst working with a table named {table}.\n\
         \n\
         The table has the following columns:\n\
         {columns}\n\
         \n\
         Convert the user's natural language question into a valid SQL query.\n\
         \n\
         Guidelines:\n\
         - Always write the SQL query assuming the table name is `{table}`\n\
         - Use standard SQL syntax\n\
         - Do not use backticks, quotation marks, or markdown formatting\n\
         - Do not include explanations, notes, or anything other than the SQL\n\
         - Only return the SQL statement starting with SELECT\n\
         \n\
         Examples:\n\
         Q: Show average income\n\
         A: SELECT AVG(Income) FROM {table};\n\
         \n\
         Q: Average wine spending by marital status\n\
         A: SELECT Marital_Status, AVG(MntWines) FROM {table} GROUP BY Marital_Status;\n\
         \n\
         Now write a valid SQL query for this user question:\n\
         Q: {question}\n\
         A:",
        table = BOUND_TABLE,
        columns = columns.join(", "),
        question = question,
    )
}

/// Prompt asking the agent to explain a query result in plain language
pub fn insight_prompt(question: &str, rendered_result: &str) -> String {
    format!(
        "You are a helpful data analyst assisting users in understanding their data.\n\
         \n\
         The user asked this question:\n\
         \"{question}\"\n\
         \n\
         Here is the output of the data analysis after executing the query:\n\
         {rendered_result}\n\
         \n\
         A chart based on this result was just shown to the user.\n\
         \n\
         Now, write a clear and simple explanation of what the result means. Focus on:\n\
         - Key trends, comparisons, or outliers\n\
         - What the user should notice from the chart\n\
         - Patterns that could be useful for decision making\n\
         \n\
         Avoid using technical terms, raw SQL, or column names. Write in simple,\n\
         natural English as if explaining to a non-technical audience.\n\
         \n\
         Keep it short, helpful, and human.",
        question = question,
        rendered_result = rendered_result,
    )
}

/// Prompt asking the agent for a chart suggestion.
///
/// The reply is surfaced to the user as advisory text only; it is never
/// executed or parsed into the displayed chart.
pub fn chart_prompt(question: &str, rendered_result: &str) -> String {
    format!(
        "You are a data visualization assistant.\n\
         \n\
         Here is the user's question:\n\
         \"{question}\"\n\
         \n\
         Here is the result table:\n\
         {rendered_result}\n\
         \n\
         Your task:\n\
         - Describe, in one short line, the best chart for this result\n\
         - Reference only column names that actually exist in the result\n\
         - Never use placeholder names like 'column_0', 'value', or 'category'\n\
         - If the result has only one column, put it on the y-axis\n\
         - If the result has two columns, use the first as x-axis and the second as y-axis\n\
         - If the result has more than two columns, choose the best pair for the question\n\
         - Return only the one-line suggestion, no extra text or formatting",
        question = question,
        rendered_result = rendered_result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_prompt_contains_columns_only() {
        let prompt = sql_prompt(
            "average income by status",
            &["Marital_Status".to_string(), "Income".to_string()],
        );
        assert!(prompt.contains("Marital_Status, Income"));
        assert!(prompt.contains("average income by status"));
        assert!(prompt.contains("table name is `df`"));
    }

    #[test]
    fn test_insight_prompt_embeds_result() {
        let prompt = insight_prompt("why?", "| a | b |");
        assert!(prompt.contains("| a | b |"));
        assert!(prompt.contains("\"why?\""));
    }
}
