//! Prompt templates for the staged tender analysis.
//!
//! Domain logic for rendering stage prompts. Provider-agnostic: templates
//! render into a [`Prompt`] and the gateway adapts it to each envelope kind.

use crate::gateway::Prompt;

/// Shared system role for every analysis prompt.
const ANALYST_SYSTEM: &str = "You are a professional legal and commercial contract analyst \
specializing in tender documents. Provide detailed, accurate analysis based on the relevant \
country's laws and regulations.";

/// A stage prompt template with placeholders.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub slug: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    fn render(&self, substitutions: &[(&str, &str)]) -> Prompt {
        let mut user = self.user.to_string();
        for (placeholder, value) in substitutions {
            user = user.replace(placeholder, value);
        }
        Prompt {
            system: ANALYST_SYSTEM.to_string(),
            user: user.trim().to_string(),
        }
    }
}

// =============================================================================
// Stage templates
// =============================================================================

pub const JURISDICTION_PROMPT: PromptTemplate = PromptTemplate {
    slug: "jurisdiction_v1",
    user: r#"
Analyze the following tender document and identify:
1. The country/jurisdiction this tender is from
2. The applicable legal system
3. Key regulatory frameworks mentioned

Document excerpt:
{document_excerpt}

Respond in JSON format:
{
  "country": "country name",
  "legalSystem": "legal system description",
  "regulations": ["regulation1", "regulation2"]
}
"#,
};

pub const LEGAL_RISK_PROMPT: PromptTemplate = PromptTemplate {
    slug: "legal_risk_v1",
    user: r#"
As a legal expert specializing in {country} contract law, analyze this tender document for legal risks:

Document:
{document}

Identify and categorize legal risks with:
1. Risk category
2. Severity level (high/medium/low)
3. Detailed description
4. Specific recommendations

Respond in JSON format:
{
  "risks": [
    {
      "category": "category name",
      "severity": "high|medium|low",
      "description": "detailed description",
      "recommendation": "specific recommendation"
    }
  ]
}
"#,
};

pub const COMMERCIAL_TERMS_PROMPT: PromptTemplate = PromptTemplate {
    slug: "commercial_terms_v1",
    user: r#"
Analyze the commercial terms in this tender document:

Document:
{document}

Extract and analyze:
1. Payment terms
2. Delivery/performance timelines
3. Penalties and liquidated damages
4. Warranty and guarantee terms
5. Price and cost structures

Respond in JSON format:
{
  "terms": [
    {
      "term": "term name",
      "value": "extracted value",
      "analysis": "professional analysis",
      "flag": "warning|info|null"
    }
  ]
}
"#,
};

pub const SYNTHESIS_PROMPT: PromptTemplate = PromptTemplate {
    slug: "synthesis_v1",
    user: r#"
Based on the analysis of this {country} tender document, provide:
1. Executive summary
2. Overall compliance score (0-100)
3. Top 5 recommendations
4. Key action items

Context:
- Legal risks identified: {risk_count}
- Commercial terms analyzed: {term_count}

Respond in JSON format:
{
  "summary": "executive summary",
  "complianceScore": 85,
  "recommendations": ["rec1", "rec2", "rec3", "rec4", "rec5"]
}
"#,
};

// =============================================================================
// Render functions
// =============================================================================

pub fn jurisdiction(document_excerpt: &str) -> Prompt {
    JURISDICTION_PROMPT.render(&[("{document_excerpt}", document_excerpt)])
}

pub fn legal_risks(document: &str, country: &str) -> Prompt {
    // Country first so placeholder-looking text inside the document survives.
    LEGAL_RISK_PROMPT.render(&[("{country}", country), ("{document}", document)])
}

pub fn commercial_terms(document: &str) -> Prompt {
    COMMERCIAL_TERMS_PROMPT.render(&[("{document}", document)])
}

pub fn synthesis(country: &str, risk_count: usize, term_count: usize) -> Prompt {
    SYNTHESIS_PROMPT.render(&[
        ("{country}", country),
        ("{risk_count}", &risk_count.to_string()),
        ("{term_count}", &term_count.to_string()),
    ])
}

// =============================================================================
// TESTS
// =============================================================================
