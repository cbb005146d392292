//! Performance benchmarks for assembly translation.
//!
//! Workloads are generated declaration trees:
//! - Size-based: 10 to 1000 types with a fixed mix of member kinds
//! - Feature-specific: algebraic types, startup values, name resolution
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect per-pass timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use jsxlate::*;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
use std::collections::HashMap;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Print accumulated time per top-level scope.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();
    let mut scope_timings: HashMap<String, i64> = HashMap::new();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let Ok(scopes) = Reader::from_start(&stream_info.stream).read_top_scopes() else {
                continue;
            };
            for scope in scopes {
                if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
                    *scope_timings.entry(details.name().to_string()).or_insert(0) +=
                        scope.record.duration_ns;
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({frame_count} frames) ===");
    let mut entries: Vec<_> = scope_timings.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    for (name, ns) in entries {
        let avg = if frame_count > 0 { ns / frame_count } else { ns };
        println!(
            "  {:30} {:>10.2?} avg",
            name,
            std::time::Duration::from_nanos(avg as u64)
        );
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

// ============================================================================
// Workloads
// ============================================================================

fn int() -> TypeRef {
    TypeRef::named(well_known::INT32)
}

/// A translated class with one member of each common kind.
fn class(i: usize) -> TypeDecl {
    let name = format!("Bench.Type{i}");
    let add = Expr::binary(BinaryOp::Add, Expr::var("a"), Expr::var("b"));
    TypeDecl::class(&name)
        .with_attribute(Attribute::JavaScript(true))
        .with_member(MemberDecl::constructor(vec![]).with_body(Expr::Undefined))
        .with_member(
            MemberDecl::method("Add", vec![Param::new("a", int()), Param::new("b", int())], int())
                .with_modifiers(MemberModifiers::STATIC)
                .with_body(add),
        )
        .with_member(
            MemberDecl::method("Twice", vec![Param::new("x", int())], int())
                .with_modifiers(MemberModifiers::STATIC)
                .with_attribute(Attribute::Inline(Some("$x * 2".into()))),
        )
        .with_member(
            MemberDecl::method("Log", vec![Param::new("m", int())], TypeRef::void())
                .with_modifiers(MemberModifiers::STATIC)
                .with_attribute(Attribute::Stub),
        )
        .with_member(
            MemberDecl::getter("Value", TypeRef::option(int())).with_attribute(Attribute::OptionalField),
        )
        .with_member(
            MemberDecl::method("Area", vec![], int())
                .with_modifiers(MemberModifiers::ABSTRACT),
        )
}

fn algebraic(i: usize) -> [TypeDecl; 2] {
    let union = TypeDecl::union(
        format!("Bench.Shape{i}"),
        vec![
            UnionCase::new("Empty", vec![]),
            UnionCase::new("Circle", vec![CaseField::new("r", int())]),
            UnionCase::new("Rect", vec![CaseField::new("w", int()), CaseField::new("h", int())]),
        ],
    )
    .with_attribute(Attribute::JavaScript(true));
    let record = TypeDecl::record(
        format!("Bench.Point{i}"),
        vec![
            RecordField::new("X", int()),
            RecordField::new("Y", int()).mutable(),
            RecordField::new("Label", TypeRef::option(TypeRef::named(well_known::STRING)))
                .with_attribute(Attribute::OptionalField),
        ],
    )
    .with_attribute(Attribute::JavaScript(true));
    [union, record]
}

fn module(i: usize, values: usize) -> TypeDecl {
    (0..values).fold(
        TypeDecl::module(format!("Bench.Module{i}")).with_attribute(Attribute::JavaScript(true)),
        |m, v| m.with_binding(BindingDecl::new(format!("value{v}"), int(), Expr::int(v as i64))),
    )
}

fn assembly(types: Vec<TypeDecl>) -> Assembly {
    let mut file = SourceFile::new("src/Bench.fs");
    file.types = types;
    Assembly::new("Bench").with_file(file)
}

fn member_count(assembly: &Assembly) -> u64 {
    assembly
        .files
        .iter()
        .flat_map(|f| &f.types)
        .map(|t| t.members.len() + t.bindings.len())
        .sum::<usize>() as u64
}

// ============================================================================
// Benchmarks
// ============================================================================

/// Translation cost as the assembly grows.
fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let prior = AssemblyMetadata::empty();
    let mut group = c.benchmark_group("translate/types");

    for types in [10usize, 100, 1000] {
        let input = assembly((0..types).map(class).collect());
        group.throughput(Throughput::Elements(member_count(&input)));
        group.bench_with_input(BenchmarkId::from_parameter(types), &input, |b, input| {
            b.iter(|| {
                let ctx = translate_assembly(
                    black_box(input),
                    &prior,
                    CompilerOptions::new().with_assembly_name("Bench"),
                );
                end_profiling_frame();
                black_box(ctx.class_count())
            });
        });
    }

    group.finish();
    print_profiling_stats();
}

/// Passes that synthesize members rather than translate them.
fn feature_specific_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let prior = AssemblyMetadata::empty();
    let mut group = c.benchmark_group("translate/features");

    let algebraic_types = assembly((0..200).flat_map(algebraic).collect());
    group.bench_function("algebraic_400", |b| {
        b.iter(|| {
            let ctx = translate_assembly(black_box(&algebraic_types), &prior, CompilerOptions::new());
            end_profiling_frame();
            black_box(ctx.class_count())
        });
    });

    let startup = assembly((0..20).map(|i| module(i, 50)).collect());
    group.bench_function("startup_1000_values", |b| {
        b.iter(|| {
            let ctx = translate_assembly(black_box(&startup), &prior, CompilerOptions::new());
            end_profiling_frame();
            black_box(ctx.class_count())
        });
    });

    // Resolution alone, on a context translated once.
    let classes = assembly((0..500).map(class).collect());
    group.bench_function("resolve_500_types", |b| {
        b.iter_batched(
            || translate_unresolved(&classes, &prior),
            |mut ctx| {
                ctx.resolve();
                end_profiling_frame();
                black_box(ctx.is_resolved())
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
    print_profiling_stats();
}

/// Translate without resolving names.
fn translate_unresolved<'meta>(
    assembly: &Assembly,
    prior: &'meta AssemblyMetadata,
) -> CompilationContext<'meta> {
    let mut ctx = CompilationContext::new(prior, CompilerOptions::new());
    TranslationPass::new(&mut ctx).run(assembly);
    ctx
}

criterion_group!(benches, size_based_benchmarks, feature_specific_benchmarks);

criterion_main!(benches);
