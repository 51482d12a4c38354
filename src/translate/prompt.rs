//! Instruction prompt sent to the text generation model

use chrono::NaiveDate;

const SCHEMA: &str = r#"Document fields you may use:
- title: string
- authors: array of strings
- journal: string
- year: integer publication year
- status: one of "unread", "read", "important" (also written 未读, 已读, 重点)
- rating: number from 1 to 5
- keywords: array of strings
- tags: array of strings
- isFavorite: boolean
- createdAt: date the paper was added (RFC 3339 or YYYY-MM-DD)
- updatedAt: date the paper was last changed (RFC 3339 or YYYY-MM-DD)

Allowed operators: $eq, $ne, $gt, $gte, $lt, $lte, $in, $nin, $all, $regex (with optional $options "i"), $exists, $and, $or.
Never use any other field or operator, and never filter on the owner or user."#;

const ANSWER_FORMAT: &str = r##"Answer with a single JSON object and nothing else:
{
  "filter": { MongoDB-style query using only the fields and operators above },
  "sort": { "field": 1 or -1 },
  "description": "one sentence explaining the filter",
  "suggestedName": "short group name in the user's language",
  "suggestedIcon": "one of fire, book, calendar, heart, star, folder, search",
  "suggestedColor": "hex color such as #00d4ff"
}

Guidelines:
1. Years and dates: use $gte / $lte; compute relative dates from today's date.
2. Fuzzy text: use $regex with "$options": "i".
3. Array fields: use $in for "any of", $all for "all of".
4. Use {} as the filter only if the request really means every paper."##;

/// Build the prompt for one request
///
/// The request text is embedded as a JSON string literal so quotes and
/// newlines in it cannot break out of the instruction block.
#[must_use]
pub fn build(request: &str, today: NaiveDate) -> String {
    let quoted = serde_json::to_string(request).unwrap_or_else(|_| format!("\"{request}\""));
    format!(
        "You translate search requests for a personal library of academic papers into structured queries.\n\
         Today's date is {today}.\n\n\
         User request: {quoted}\n\n\
         {SCHEMA}\n\n\
         {ANSWER_FORMAT}",
        today = today.format("%Y-%m-%d"),
    )
}
