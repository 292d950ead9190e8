use std::sync::LazyLock;

use regex::Regex;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:sql)?\s*\n?").expect("leading fence pattern"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("trailing fence pattern"));

/// Strip markdown fencing from model-generated SQL.
///
/// Removes one leading ```` ``` ```` / ```` ```sql ```` opener, one trailing
/// fence, every remaining backtick, and surrounding whitespace. Idempotent.
pub fn clean_sql(raw: &str) -> String {
    let sql = LEADING_FENCE.replace(raw.trim(), "");
    let sql = TRAILING_FENCE.replace(sql.trim(), "");
    sql.replace('`', "").trim().to_string()
}
