// Prompt templates (minijinja syntax: `{{ var }}`; single braces are literal).

pub const MESSAGE_CLASSIFIER: &str = r#"Classify the user message into one of:
- generic
- analytical
- data_specific

User message: {{ user_message }}

Return ONLY the label."#;

pub const GENERIC_REPLY: &str = r#"User message: {{ user_message }}

Generate a polite and short reply indicating they should ask a data or analytics related question about their database."#;

pub const SQL_GENERATOR: &str = r#"You are an expert in MindsDB SQL generation.

Database type: {{ db_type }}
Database name: {{ db_name }}
Tables:
{{ tables }}

Relationships:
{{ relationships }}

Semantics:
{{ semantics }}

User request:
{{ user_message }}

Generate a VALID MindsDB SQL query for the given database type.

FORMATTING REQUIREMENTS:
1. Return ONLY the raw SQL query
2. NO markdown formatting, code fences, or backticks
3. NO explanations or comments
4. Each SQL clause (SELECT, FROM, JOIN, WHERE, GROUP BY, ORDER BY, LIMIT) must be on a NEW LINE
5. Indent nested clauses with 4 spaces
6. Put spaces around operators (=, <, >, AND, OR)"#;

pub const SUMMARY: &str = r#"User request:
{{ user_message }}

SQL executed:
{{ sql_query }}

Data:
{{ data }}

Write a brief summary and insights about the response.
It can be detailed if the user request asks for detail."#;

pub const RELATIONSHIPS: &str = r#"You are a database architect expert. Analyze the following database schema and identify all relationships between tables.

Database Schema:
{{ schema }}

Instructions:
1. Identify foreign key relationships (columns ending with _id typically reference the 'id' column of another table)
2. Determine the relationship type:
   - "one-to-many": One record in source can relate to many in target
   - "many-to-one": Many records in source relate to one in target
   - "one-to-one": One record in source relates to one in target
3. Provide a brief description of each relationship
4. Create a summary of the overall database structure

{{ format_instructions }}

Return ONLY valid JSON, no additional text."#;

pub const RELATIONSHIPS_FORMAT: &str = r#"The output must be a JSON object of this shape:
{
  "relationships": [
    {
      "source_table": "string",
      "source_column": "string",
      "target_table": "string",
      "target_column": "string",
      "relationship_type": "one-to-many | many-to-one | one-to-one",
      "description": "string or null"
    }
  ],
  "summary": "string"
}"#;

pub const SEMANTICS: &str = r#"You are a database documentation expert. Generate concise semantic descriptions for the following database schema.

Database Schema:
{{ schema }}

Instructions:
1. For each table, provide a single concise semantic_description (one sentence, around 15-25 words)
2. The description should explain the table's purpose and business value
3. For each column in the table, provide a concise semantic_description (one sentence, around 10-15 words)
4. Focus on business meaning, not technical details

Return the data in this EXACT JSON format:
{
  "tables": [
    {
      "table_name": "table1",
      "semantic_description": "Brief description of table purpose and business value",
      "columns": [
        {
          "column_name": "column1",
          "semantic_description": "Brief description of column purpose"
        }
      ]
    }
  ]
}

Generate descriptions for ALL tables and ALL columns in the schema.
Return ONLY the JSON object with a "tables" array, no additional text or markdown."#;

pub const ANALYTICS: &str = r#"You are a dashboard planner and analytics configuration generator. Given database information, plan and generate multiple dashboard panels and their analytics configuration.

Database Schema:
{{ schemas }}

Relationships:
{{ relationships }}

Semantic Information:
{{ semantics }}

Database Type:
{{ db_type }}

Panel Format:
{
    "title": "string",
    "description": "string",
    "active": true | false,
    "grid_pos": { "x": number, "y": number, "w": number, "h": number },
    "options": { "key": "value" } (optional),
    "config": {
        "id": "string",
        "type": "bar" | "line" | "area" | "pie" | "scatter" | "radar" | "composed" | "table" | "kpi" | "metric",
        "title": "string",
        "subtitle": "string (optional)",
        "sql_query": "SELECT ...",
        "x_axis": "string",
        "y_axis": ["string"],
        "config": {
            "colors": ["string"] (optional),
            "stacked": true | false (optional),
            "showGrid": true | false (optional),
            "showLegend": true | false (optional),
            "orientation": "horizontal" | "vertical" (optional),
            "curve": "monotone" | "linear" | "step" (optional)
        }
    }
}

Rules:
- Output is valid JSON only (no markdown, comments, or explanations): a JSON array of panels.
- Generate a VALID MindsDB SQL query for the database type {{ db_type }} in every panel.
- x_axis and y_axis must be column names from the schema.
- Do not filter varchar or text columns on specific literal values.
- The grid has 32 columns.
- 'kpi' and 'metric' panels have height exactly 4; every other panel has height at most 8.
- 'line', 'area', 'bar', 'scatter', 'table' and 'composed' panels are at least 16 wide; 'pie' and 'radar' at least 8.
- At most 4 'kpi'/'metric' panels combined and at most 5 other panels.
- Always include "area", "table" and "bar" charts.

Generate a dashboard configuration for the given database information."#;
