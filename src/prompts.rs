//! Fixed prompt templates. Each aspect owns exactly one template; call
//! sites never edit them.

use crate::backend::PromptTemplate;

pub const MAIN_EXPLANATION: PromptTemplate = PromptTemplate {
    name: "main_explanation",
    template: "Given the following summary of a research paper:\n\n{summary}\n\n\
               Explain the following part of the paper for a {difficulty} level reader:\n\n{chunk}\n\n\
               Provide a clear and concise explanation of the main ideas, methodology, and findings in this part, \
               considering how it fits into the overall paper.",
    input_variables: &["summary", "chunk", "difficulty"],
};

pub const EXAMPLES: PromptTemplate = PromptTemplate {
    name: "examples",
    template: "Given the following summary of a research paper:\n\n{summary}\n\n\
               Based on this part of the paper:\n\n{chunk}\n\n\
               Provide concrete examples that illustrate the main concepts or findings in this section.",
    input_variables: &["summary", "chunk"],
};

pub const PREREQUISITES: PromptTemplate = PromptTemplate {
    name: "prerequisites",
    template: "Given the following summary of a research paper:\n\n{summary}\n\n\
               For this part of the paper:\n\n{chunk}\n\n\
               Identify and explain the key prerequisites needed to understand this section.",
    input_variables: &["summary", "chunk"],
};

pub const MATH_CONCEPTS: PromptTemplate = PromptTemplate {
    name: "math_concepts",
    template: "Given the following summary of a research paper:\n\n{summary}\n\n\
               For this part of the paper:\n\n{chunk}\n\n\
               Explain in detail the key mathematical concepts and equations in this section.\
               If no mathematical concept or equations are there return an empty string, don't make up anything up",
    input_variables: &["summary", "chunk"],
};

pub const SEARCH_KEYWORDS: PromptTemplate = PromptTemplate {
    name: "search_keywords",
    template: "Based on the following summary of a research paper, suggest keywords for finding similar papers:\n\n\
               {summary}\n\nKeywords:",
    input_variables: &["summary"],
};

pub const SEARCH_QUERY: PromptTemplate = PromptTemplate {
    name: "search_query",
    template: "Based on {keywords} make an web search optimized query for searching similar research papers \
               on site:arxiv.org OR site:scholar.google.com",
    input_variables: &["keywords"],
};

pub const SIMILAR_PAPERS_SUMMARY: PromptTemplate = PromptTemplate {
    name: "similar_papers_summary",
    template: "Given this summary of a research paper:\n\n{summary}\n\n\
               And based on the following search results, provide a brief summary of 2-3 similar research papers:\n\n\
               {search_results}",
    input_variables: &["summary", "search_results"],
};

// Summarization.

pub const SUMMARIZE: PromptTemplate = PromptTemplate {
    name: "summarize",
    template: "Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:",
    input_variables: &["text"],
};

pub const REFINE: PromptTemplate = PromptTemplate {
    name: "refine",
    template: "Your job is to produce a final summary\n\
               We have provided an existing summary up to a certain point: {existing_answer}\n\
               We have the opportunity to refine the existing summary (only if needed) with some more context below.\n\
               ------------\n{text}\n------------\n\
               Given the new context, refine the original summary\n\
               If the context isn't useful, return the original summary.",
    input_variables: &["existing_answer", "text"],
};
