// Graph page rendering
//
// Produces the single self-contained HTML document served to the browser.
// The whole call graph is embedded into the page once at render time.

use crate::error::Result;
use crate::graph::CallGraph;
use tera::{Context, Tera};

/// Renders the visualization page from the embedded template
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(
            "graph.html",
            include_str!("../../templates/graph.html.tera"),
        )])?;
        Ok(Self { tera })
    }

    /// Render the page with the full graph serialized into it
    pub fn render(&self, graph: &CallGraph, project_name: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("project_name", project_name);
        context.insert("graph_json", &serde_json::to_string(graph)?);
        context.insert("stats", &graph.stats());

        Ok(self.tera.render("graph.html", &context)?)
    }
}
