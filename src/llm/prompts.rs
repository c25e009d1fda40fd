//! Prompt templates for the generative sources
//!
//! All prompts push the model toward maximum recall: extract any name that
//! might plausibly be a leader, even at low confidence. Structured JSON is
//! requested but never relied on; the parser in `extract` handles prose.

/// System message for the aggressive OpenAI extraction source.
pub fn extraction_system() -> &'static str {
    "You are an expert at extracting human names from business content. \
     You are very generous in finding names and never give up easily. \
     Always return JSON."
}

/// Aggressive extraction prompt (OpenAI source). The "name extraction expert"
/// phrase keys the mock client.
pub fn aggressive_extraction(company: &str, context: &str) -> String {
    format!(
        r#"You are a name extraction expert. Your job is to find ANY person's name associated with {company}.

AVAILABLE INFORMATION:
{context}

TASK: Find ANY person who might be associated with {company} leadership.

INSTRUCTIONS:
- Look for ANYONE mentioned as: CEO, founder, president, owner, director, manager, chairman, co-founder, executive, leader
- Even if not explicitly called "CEO", extract any person's name mentioned in a leadership context
- Look for names in phrases like "founded by", "started by", "led by", "created by", "owned by", "managed by"
- If you see ANY proper names (First Last) mentioned with the company, include them
- Be VERY generous - include any name that might be a leader
- Even if confidence is low, still extract the name

REQUIRED OUTPUT (JSON only):
{{
    "ceo_name": "Any person's name found (First Last format)",
    "ceo_title": "Their role/title if mentioned",
    "confidence": "high/medium/low",
    "source": "Where you found the name"
}}

If you find MULTIPLE names, pick the most senior/leadership-oriented one.
Only return "Not found" if there are absolutely NO human names in the text.

Extract any leadership name you can find:"#
    )
}

/// Researcher-framed prompt (Anthropic source). The "expert business
/// researcher" phrase keys the mock client.
pub fn researcher(company: &str, context: &str) -> String {
    format!(
        r#"You are an expert business researcher. Find ANY person associated with {company} leadership.

RESEARCH DATA:
{context}

TASK: Extract ANY person's name who might be a leader of {company}.

Look for:
- CEO, Chief Executive Officer, President, Founder, Co-founder, Owner
- Director, Manager, Chairman, Executive, Leader
- Anyone who "founded", "started", "created", "owns", "leads", "manages" the company

INSTRUCTIONS:
- Be VERY generous - extract any name that might be a leader
- Include founders, owners, presidents - not just CEOs
- If you find multiple names, pick the most senior one
- Extract the name even with low confidence

Return ONLY this JSON format:
{{
    "ceo_name": "Person's full name (First Last)",
    "ceo_title": "Their role/title",
    "confidence": "high/medium/low",
    "source": "analysis"
}}

Find any leadership name you can:"#
    )
}

/// Shorter generative prompt (Gemini source).
pub fn generative(company: &str, context: &str) -> String {
    format!(
        r#"Find ANY person associated with {company} leadership.

INFORMATION:
{context}

Look for ANY person's name mentioned as:
- CEO, founder, president, owner, director, manager, chairman, executive
- Anyone who "founded", "started", "created", "owns", "leads", "manages" the company

Be very generous - if you see any human name, extract it.

Return JSON:
{{
"ceo_name": "Person's full name",
"ceo_title": "Their role",
"confidence": "high/medium/low",
"source": "AI analysis"
}}

Find any leadership name:"#
    )
}

/// Knowledge-only queries tried in order against the primary model.
pub fn knowledge_queries(company: &str) -> Vec<String> {
    [
        format!("Who is the founder of {}?", company),
        format!("Who is the CEO of {}?", company),
        format!("Who owns {}?", company),
        format!("Who started {}?", company),
        format!("Who is in the leadership of {}?", company),
    ]
    .into_iter()
    .map(|q| format!("{} Give me any names you know, even if not 100% certain.", q))
    .collect()
}

/// Ask the model for its best guess at a LinkedIn profile URL. The "most
/// likely LinkedIn profile URL" phrase keys the mock client.
pub fn linkedin_url_guess(person: &str, company: &str) -> String {
    format!(
        r#"Based on the name "{person}" who works at "{company}", generate the most likely LinkedIn profile URL.

LinkedIn URLs follow the pattern: https://linkedin.com/in/[username]

Common username patterns:
- firstname-lastname
- firstnamelastname
- firstname-lastname-numbers
- firstinitiallastname

Return ONLY the most probable LinkedIn URL, nothing else.

Example format: https://linkedin.com/in/john-smith"#
    )
}
