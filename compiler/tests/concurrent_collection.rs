use std::sync::Arc;
use std::thread;

use cinder_compiler::semantics::symbols::{ScopeTree, SourceLocation, SymbolKind, collect};
use cinder_core::{SourceBuffer, Span, parse};

const THREADS: usize = 8;
const FILES_PER_THREAD: usize = 25;

fn collect_source(tree: &ScopeTree, name: String, text: String) {
    let source = Arc::new(SourceBuffer::new(name, text));
    let parsed = parse(Arc::clone(&source));
    let program = parsed
        .accepted()
        .unwrap_or_else(|| panic!("parse failed: {}", parsed.diagnostics));

    let output = collect(tree, program, &source);
    assert!(output.succeeded(), "{}", output.diagnostics);
}

#[test]
fn concurrent_collectors_lose_no_symbols() {
    let tree = ScopeTree::with_natives();

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let tree = &tree;
            scope.spawn(move || {
                for file in 0..FILES_PER_THREAD {
                    collect_source(
                        tree,
                        format!("worker{worker}_{file}.cin"),
                        format!("mod pkg_{worker}_{file}\nmain : entry(x: i32) {{}}\n"),
                    );
                    collect_source(
                        tree,
                        format!("shared{worker}_{file}.cin"),
                        format!("mod shared.inner\nrun_{worker}_{file} : entry() {{}}\n"),
                    );
                }
            });
        }
    });

    for worker in 0..THREADS {
        for file in 0..FILES_PER_THREAD {
            let module = format!("pkg_{worker}_{file}");
            assert!(
                tree.resolve_path(&[module.as_str(), "main"]).is_some(),
                "lost {module}"
            );
            let entry = format!("run_{worker}_{file}");
            assert!(
                tree.resolve_path(&["shared", "inner", entry.as_str()]).is_some(),
                "lost {entry}"
            );
        }
    }

    let shared = tree
        .resolve_path(&["shared"])
        .and_then(|id| tree.symbol(id))
        .expect("shared module exists");
    assert!(matches!(shared.kind, SymbolKind::Module { .. }));
    assert_eq!(shared.declarations.len(), THREADS * FILES_PER_THREAD);

    let inner = tree
        .resolve_path(&["shared", "inner"])
        .and_then(|id| tree.symbol(id))
        .and_then(|symbol| symbol.owned_scope())
        .expect("inner module has a scope");
    assert_eq!(tree.symbols_in(inner).len(), THREADS * FILES_PER_THREAD);
}

#[test]
fn racing_modules_share_one_scope() {
    let tree = ScopeTree::new();

    let scopes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let tree = &tree;
                scope.spawn(move || {
                    let source = Arc::new(SourceBuffer::raw("mod common"));
                    let location = SourceLocation::new(&source, Span::new(4, 10));
                    tree.open_module(tree.root(), "common", location)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    let first = scopes[0].expect("module opens");
    assert!(scopes.iter().all(|opened| *opened == Ok(first)));
    assert_eq!(tree.symbol_count(), 1);
}
