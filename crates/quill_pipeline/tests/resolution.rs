//! Pipeline selection for typical inputs.

use std::path::Path;

use quill_pipeline::{plan, resolve, Backend, Frontend, PipelineError, Step};

#[test]
fn coq_source_becomes_a_webpage() {
    let r = resolve("src/intro.v", None, None, None).unwrap();
    assert_eq!((r.frontend, r.backend), (Frontend::CoqRst, Backend::Webpage));
    assert_eq!(
        r.steps.last(),
        Some(&Step::WriteFile {
            ext: ".html",
            strip: &[".v", ".rst"]
        })
    );
}

#[test]
fn json_fragments_become_json() {
    let r = resolve("src/intro.v.json", None, None, None).unwrap();
    assert_eq!((r.frontend, r.backend), (Frontend::CoqJson, Backend::Json));
}

#[test]
fn output_suffix_picks_the_backend() {
    let cases = [
        ("a.v", "a.lint.json", Backend::Lint),
        ("a.v", "a.v.tex", Backend::Latex),
        ("a.v.json", "a.snippets.html", Backend::SnippetsHtml),
        ("a.rst", "a.v", Backend::Coq),
    ];
    for (input, output, backend) in cases {
        let r = resolve(input, None, None, Some(Path::new(output))).unwrap();
        assert_eq!(r.backend, backend, "{input} -> {output}");
    }
}

#[test]
fn lean_output_is_never_supported() {
    let err = resolve("a.lean", None, None, Some(Path::new("b.lean"))).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedBackend { .. }));
}

#[test]
fn every_input_is_resolved_up_front() {
    let inputs: Vec<String> = ["a.v", "b.lean3.json", "c.md"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let jobs = plan(&inputs, None, None, None, None).unwrap();
    let pairs: Vec<_> = jobs
        .iter()
        .map(|j| (j.resolved.frontend, j.resolved.backend))
        .collect();
    assert_eq!(
        pairs,
        [
            (Frontend::CoqRst, Backend::Webpage),
            (Frontend::Lean3Json, Backend::Json),
            (Frontend::Md, Backend::Webpage),
        ]
    );

    let err = plan(&inputs, None, Some(Backend::Rst), None, None).unwrap_err();
    assert!(err.to_string().contains("Frontend 'lean3.json' does not support backend 'rst'"));
}
