use crate::completion::CompletionRequest;

/// JSON shape the service must answer with
pub const RESPONSE_FORMAT: &str = r#"{
  "fileDescription": "Short description of what the file does",
  "mainPurpose": "Primary responsibility of the file",
  "dependencies": {
    "imports": ["Imported packages or modules"],
    "referencedFiles": ["Other project files referenced or used"],
    "externalDependencies": ["External services or APIs used"]
  },
  "keyFunctionality": ["Key functions or features"],
  "technicalDetails": {
    "language": "Programming language",
    "framework": "Framework, or null",
    "type": "Kind of file (component, utility, route, ...)"
  }
}"#;

/// Render the analysis prompt for one file
pub fn render_prompt(request: &CompletionRequest) -> String {
    format!(
        "Analyze the file below and describe it as structured data.\n\
         Filename: {filename}\n\
         Language: {language}\n\
         Content:\n{content}\n\n\
         Respond with a single JSON object in exactly this format and nothing else:\n\
         {RESPONSE_FORMAT}\n\n\
         Pay particular attention to imports and to references to other files in the project.",
        filename = request.filename,
        language = request.language,
        content = request.content,
    )
}
