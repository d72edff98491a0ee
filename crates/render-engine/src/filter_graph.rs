//! Typed builder for ffmpeg filter graphs.
//!
//! Filters are accumulated as labelled chains and rendered once into the
//! textual form expected by `-vf` / `-filter_complex`. Option values that
//! contain filtergraph metacharacters are quoted on render, so callers never
//! hand-escape expressions.

use std::collections::HashSet;
use std::fmt::Display;

use reelsmith_common::error::{ReelError, ReelResult};

#[derive(Debug, Clone, PartialEq)]
enum FilterArg {
    Positional(String),
    Named(String, String),
}

/// A single filter with its arguments, e.g. `xfade=transition=fade:duration=0.5`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    args: Vec<FilterArg>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Display) -> Self {
        self.args.push(FilterArg::Positional(value.to_string()));
        self
    }

    /// Append a `key=value` option.
    pub fn opt(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.args
            .push(FilterArg::Named(key.into(), value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| match arg {
                FilterArg::Positional(value) => quote_value(value),
                FilterArg::Named(key, value) => format!("{key}={}", quote_value(value)),
            })
            .collect();
        format!("{}={}", self.name, args.join(":"))
    }
}

/// Quote an option value if it contains characters the filtergraph parser
/// would otherwise split on.
fn quote_value(value: &str) -> String {
    const SPECIAL: &[char] = &['\\', '\'', ':', ',', ';', '[', ']', ' ', '='];
    if !value.contains(SPECIAL) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// A linear run of filters between input and output pad labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    inputs: Vec<String>,
    filters: Vec<Filter>,
    outputs: Vec<String>,
}

impl FilterChain {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for label in &self.inputs {
            out.push('[');
            out.push_str(label);
            out.push(']');
        }
        let body: Vec<String> = self.filters.iter().map(Filter::render).collect();
        out.push_str(&body.join(","));
        for label in &self.outputs {
            out.push('[');
            out.push_str(label);
            out.push(']');
        }
        out
    }
}

/// Accumulates labelled chains and renders one well-formed graph.
#[derive(Debug, Clone, Default)]
pub struct FilterGraphBuilder {
    chains: Vec<FilterChain>,
}

impl FilterGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chain reading `inputs` and writing `outputs`.
    ///
    /// Inputs are either stream specifiers (`0:v`, `3:a`) or labels written
    /// by an earlier chain.
    pub fn chain<I, O>(&mut self, inputs: I, filters: Vec<Filter>, outputs: O) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        self.chains.push(FilterChain {
            inputs: inputs.into_iter().map(Into::into).collect(),
            filters,
            outputs: outputs.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Render the graph, checking label wiring.
    ///
    /// Every non-stream input must have been produced by an earlier chain and
    /// may be consumed only once; no label may be produced twice.
    pub fn build(&self) -> ReelResult<String> {
        if self.chains.is_empty() {
            return Err(ReelError::render("Filter graph is empty"));
        }

        let mut produced: HashSet<&str> = HashSet::new();
        let mut consumed: HashSet<&str> = HashSet::new();

        for chain in &self.chains {
            if chain.filters.is_empty() {
                return Err(ReelError::render("Filter chain has no filters"));
            }
            for input in &chain.inputs {
                if is_stream_specifier(input) {
                    continue;
                }
                if !produced.contains(input.as_str()) {
                    return Err(ReelError::render(format!(
                        "Filter graph input [{input}] is not produced by an earlier chain"
                    )));
                }
                if !consumed.insert(input.as_str()) {
                    return Err(ReelError::render(format!(
                        "Filter graph label [{input}] is consumed twice"
                    )));
                }
            }
            for output in &chain.outputs {
                if !produced.insert(output.as_str()) {
                    return Err(ReelError::render(format!(
                        "Filter graph label [{output}] is produced twice"
                    )));
                }
            }
        }

        Ok(self
            .chains
            .iter()
            .map(FilterChain::render)
            .collect::<Vec<_>>()
            .join(";"))
    }
}

/// Render an unlabelled chain for `-vf`.
pub fn simple_chain(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::render)
        .collect::<Vec<_>>()
        .join(",")
}

fn is_stream_specifier(label: &str) -> bool {
    label
        .split(':')
        .next()
        .is_some_and(|head| !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_render_forms() {
        assert_eq!(Filter::new("null").render(), "null");
        assert_eq!(
            Filter::new("pad").arg(1920).arg(1080).arg("(ow-iw)/2").render(),
            "pad=1920:1080:(ow-iw)/2"
        );
        assert_eq!(
            Filter::new("xfade")
                .opt("transition", "fade")
                .opt("duration", "0.500")
                .render(),
            "xfade=transition=fade:duration=0.500"
        );
    }

    #[test]
    fn test_expression_with_comma_is_quoted() {
        let zoom = Filter::new("zoompan").opt("z", "min(zoom+0.001,1.25)").opt("d", 1);
        assert_eq!(zoom.render(), "zoompan=z='min(zoom+0.001,1.25)':d=1");
    }

    #[test]
    fn test_single_quote_is_escaped() {
        assert_eq!(quote_value("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_graph_wiring_and_render() {
        let mut graph = FilterGraphBuilder::new();
        graph
            .chain(["0:v"], vec![Filter::new("settb").arg("AVTB")], ["v0"])
            .chain(["1:v"], vec![Filter::new("settb").arg("AVTB")], ["v1"])
            .chain(
                ["v0", "v1"],
                vec![Filter::new("xfade")
                    .opt("transition", "fade")
                    .opt("duration", "0.500")
                    .opt("offset", "4.500")],
                ["vout"],
            );
        assert_eq!(
            graph.build().unwrap(),
            "[0:v]settb=AVTB[v0];[1:v]settb=AVTB[v1];\
             [v0][v1]xfade=transition=fade:duration=0.500:offset=4.500[vout]"
        );
    }

    #[test]
    fn test_source_chain_without_inputs() {
        let mut graph = FilterGraphBuilder::new();
        graph.chain(
            Vec::<String>::new(),
            vec![
                Filter::new("anullsrc")
                    .opt("channel_layout", "stereo")
                    .opt("sample_rate", 44100),
                Filter::new("atrim").opt("duration", "9.000"),
            ],
            ["aout"],
        );
        assert_eq!(
            graph.build().unwrap(),
            "anullsrc=channel_layout=stereo:sample_rate=44100,atrim=duration=9.000[aout]"
        );
    }

    #[test]
    fn test_undefined_label_is_rejected() {
        let mut graph = FilterGraphBuilder::new();
        graph.chain(["v9"], vec![Filter::new("null")], ["vout"]);
        let err = graph.build().unwrap_err();
        assert!(err.to_string().contains("[v9]"));
    }

    #[test]
    fn test_label_reuse_is_rejected() {
        let mut graph = FilterGraphBuilder::new();
        graph
            .chain(["0:v"], vec![Filter::new("null")], ["v0"])
            .chain(["v0"], vec![Filter::new("null")], ["a"])
            .chain(["v0"], vec![Filter::new("null")], ["b"]);
        assert!(graph.build().unwrap_err().to_string().contains("consumed twice"));
    }

    #[test]
    fn test_simple_chain() {
        let vf = simple_chain(&[
            Filter::new("scale").arg(1280).arg(720),
            Filter::new("format").arg("yuv420p"),
        ]);
        assert_eq!(vf, "scale=1280:720,format=yuv420p");
    }
}
