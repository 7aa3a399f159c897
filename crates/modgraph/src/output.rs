//! Plain renderings of an analysis result for the command line.

use std::fmt::Write as _;

use crate::graph::DependencyGraph;

/// Output format of the dependency mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `module: dep, dep` line per module
    #[default]
    Text,
    /// A JSON object mapping each module to its dependencies
    Json,
}

pub fn render(graph: &DependencyGraph, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(graph)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(graph)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_text(graph: &DependencyGraph) -> String {
    let mut output = String::new();
    for (module, dependencies) in graph.iter() {
        output.push_str(module);
        output.push(':');
        for (index, dependency) in dependencies.iter().enumerate() {
            output.push_str(if index == 0 { " " } else { ", " });
            output.push_str(dependency.name());
        }
        output.push('\n');
    }
    output
}

/// One package per line
pub fn render_requirements(packages: &[&str]) -> String {
    packages.iter().fold(String::new(), |mut output, package| {
        let _ = writeln!(output, "{package}");
        output
    })
}

/// One cycle per line, closed back onto its first module
pub fn render_cycles(cycles: &[Vec<&str>]) -> String {
    let mut output = String::new();
    for cycle in cycles {
        let Some(first) = cycle.first() else {
            continue;
        };
        let _ = writeln!(output, "{} -> {}", cycle.join(" -> "), first);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Dependency;

    fn sample() -> DependencyGraph {
        DependencyGraph::from_modules([
            (
                "pkg.a".to_owned(),
                [
                    Dependency::External("numpy".to_owned()),
                    Dependency::Internal("pkg.b".to_owned()),
                ]
                .into_iter()
                .collect(),
            ),
            ("pkg.b".to_owned(), indexmap::IndexSet::new()),
        ])
    }

    #[test]
    fn test_render_text() {
        insta::assert_snapshot!(render(&sample(), OutputFormat::Text).unwrap(), @r"
        pkg.a: numpy, pkg.b
        pkg.b:
        ");
    }

    #[test]
    fn test_render_json() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({"pkg.a": ["numpy", "pkg.b"], "pkg.b": []}));
    }

    #[test]
    fn test_render_cycles() {
        let cycles = vec![vec!["pkg.a", "pkg.b"], vec!["pkg.c"]];
        assert_eq!(render_cycles(&cycles), "pkg.a -> pkg.b -> pkg.a\npkg.c -> pkg.c\n");
    }

    #[test]
    fn test_render_requirements() {
        assert_eq!(render_requirements(&["Pillow", "numpy"]), "Pillow\nnumpy\n");
        assert_eq!(render_requirements(&[]), "");
    }
}
