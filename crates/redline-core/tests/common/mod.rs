use redline_core::{ChangeEngine, Element, EngineConfig};

/// Elements `p-1` .. `p-n` with the given contents, in order
#[allow(dead_code)]
pub fn paragraphs(contents: &[&str]) -> Vec<Element> {
    contents
        .iter()
        .enumerate()
        .map(|(i, c)| Element::para(format!("p-{}", i + 1), *c))
        .collect()
}

/// The two-paragraph document used by the end-to-end scenarios
#[allow(dead_code)]
pub fn two_paragraph_engine() -> ChangeEngine {
    ChangeEngine::new(paragraphs(&["First paragraph", "Second paragraph"]))
        .expect("valid initial elements")
}

#[allow(dead_code)]
pub fn three_paragraph_engine() -> ChangeEngine {
    ChangeEngine::new(paragraphs(&["One", "Two", "Three"])).expect("valid initial elements")
}

#[allow(dead_code)]
pub fn engine_with_config(contents: &[&str], config: EngineConfig) -> ChangeEngine {
    ChangeEngine::with_config(paragraphs(contents), config).expect("valid initial elements")
}

/// Current element IDs in document order
#[allow(dead_code)]
pub fn ids(engine: &ChangeEngine) -> Vec<String> {
    engine
        .current_state()
        .into_iter()
        .map(|e| e.id.to_string())
        .collect()
}

/// Current element contents in document order
#[allow(dead_code)]
pub fn contents(engine: &ChangeEngine) -> Vec<String> {
    engine
        .current_state()
        .into_iter()
        .map(|e| e.content)
        .collect()
}
