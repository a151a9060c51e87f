//! This bench simulates resolving the visible fields of a large, deeply
//! branched form while an inspection is mostly answered.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion};
use formwork::{
    resolve_visible_fields, AnswerValues, Branch, Field, FieldControl, FieldName, FieldPath,
};
use nonempty::NonEmpty;

/// Builds a chain of selects where each "NG" answer reveals the next stage.
fn staged_tree(depth: usize) -> Vec<Field> {
    let mut revealed = Vec::new();
    for level in (0..depth).rev() {
        let field = Field {
            id: None,
            name: FieldName::new(format!("Stage {level}")).unwrap(),
            control: FieldControl::SingleSelect {
                options: NonEmpty::from_vec(vec!["OK".to_string(), "NG".to_string()]).unwrap(),
            },
            is_required: true,
            order: 0,
            flag_rule: None,
            branches: if revealed.is_empty() {
                Vec::new()
            } else {
                vec![Branch {
                    trigger: "NG".to_string(),
                    revealed,
                }]
            },
        };
        revealed = vec![field];
    }
    revealed
}

/// Answers every stage "NG" so the whole chain is revealed.
fn answer_all(depth: usize) -> AnswerValues {
    let mut answers = AnswerValues::new();
    let mut path = FieldPath::root();
    for level in 0..depth {
        path = path.child(&format!("Stage {level}"));
        answers.insert(path.clone(), "NG");
    }
    answers
}

fn resolve_fields(c: &mut Criterion) {
    let roots: Vec<Field> = (0..50).flat_map(|_| staged_tree(20)).collect();
    let answers = answer_all(20);

    c.bench_function("resolve fields", |b| {
        b.iter(|| resolve_visible_fields(&roots, &answers));
    });
}

criterion_group!(benches, resolve_fields);
criterion_main!(benches);
