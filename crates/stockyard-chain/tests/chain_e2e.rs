//! End-to-end build chain tests.
//!
//! These tests run complete chains against real factories and verify:
//!
//! 1. Execution order - the recipe runs first, stages post-process outward
//! 2. Merge placement - overrides are applied before any custom stage
//! 3. Normalization - idempotent under arbitrary mutation sequences

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use stockyard_chain::{BuildChain, FnStage, MergeStage, StageRef, TraceStage, MERGE_STAGE};
use stockyard_core::{
    fields, BuildContext, BuildError, BuildResult, BuildScope, Factory, FactoryOptions, Fields,
    Product,
};

/// Scope that rejects nested builds.
struct NoScope;

impl BuildScope for NoScope {
    fn build_nested(
        &self,
        _parent: &BuildContext<'_>,
        name: &str,
        _overrides: Fields,
    ) -> BuildResult<Product> {
        Err(BuildError::undefined(name))
    }
}

fn user_factory() -> Arc<Factory> {
    Arc::new(Factory::new("user", FactoryOptions::new(), |_| {
        Ok(fields! { "email" => "a@b.com", "name" => "Ann" }.into())
    }))
}

/// Stage that records the `email` it sees on the way out.
fn snooping_stage(name: &'static str, seen: Arc<Mutex<Vec<String>>>) -> StageRef {
    Arc::new(FnStage::new(name, move |ctx, next| {
        let product = next.run(ctx)?;
        let email = product
            .get("email")
            .and_then(Product::as_str)
            .unwrap_or_default()
            .to_string();
        seen.lock().unwrap().push(format!("{name}:{email}"));
        Ok(product)
    }))
}

#[test]
fn test_default_chain_merges_overrides() {
    let chain = BuildChain::new();
    let ctx = BuildContext::new(&NoScope, user_factory(), fields! { "email" => "c@d.com" });

    let product = chain.execute(&ctx).unwrap();
    assert_eq!(product.get("email").and_then(Product::as_str), Some("c@d.com"));
    assert_eq!(product.get("name").and_then(Product::as_str), Some("Ann"));
}

#[test]
fn test_custom_stages_see_merged_product() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    // Merge listed first on purpose; normalization moves it innermost.
    let chain = BuildChain::from_stages([
        Arc::new(MergeStage) as StageRef,
        snooping_stage("outer", seen.clone()),
        snooping_stage("inner", seen.clone()),
    ]);
    let ctx = BuildContext::new(&NoScope, user_factory(), fields! { "email" => "c@d.com" });

    chain.execute(&ctx).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["inner:c@d.com", "outer:c@d.com"]);
}

#[test]
fn test_outer_stage_transforms_last() {
    let mut chain = BuildChain::new();
    chain.push_front(FnStage::new("wrap", |ctx, next| {
        let inner = next.run(ctx)?;
        Ok(fields! { "wrapped" => inner }.into())
    }));
    chain.push_front(TraceStage::new());
    let ctx = BuildContext::new(&NoScope, user_factory(), fields! { "name" => "Bob" });

    let product = chain.execute(&ctx).unwrap();
    let inner = product.get("wrapped").unwrap();
    assert_eq!(inner.get("name").and_then(Product::as_str), Some("Bob"));
}

#[test]
fn test_recipe_runs_once_per_execute() {
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = calls.clone();
    let factory = Arc::new(Factory::new("counter", FactoryOptions::new(), move |_| {
        *counter.lock().unwrap() += 1;
        Ok(Product::map())
    }));
    let chain = BuildChain::new().with_stage(TraceStage::new());
    let ctx = BuildContext::new(&NoScope, factory, Fields::new());

    chain.execute(&ctx).unwrap();
    chain.execute(&ctx).unwrap();
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[test]
fn test_recipe_error_passes_through_stages() {
    let factory = Arc::new(Factory::new("broken", FactoryOptions::new(), |_| {
        Err(BuildError::recipe(std::io::Error::other("boom")))
    }));
    let chain = BuildChain::new().with_stage(TraceStage::new());
    let ctx = BuildContext::new(&NoScope, factory, fields! { "x" => 1 });

    let err = chain.execute(&ctx).unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

/// A chain mutation, as a caller might apply it between builds.
#[derive(Debug, Clone)]
enum Mutation {
    Push(&'static str),
    PushFront(&'static str),
    Insert(usize, &'static str),
    Remove(&'static str),
    Reverse,
}

fn stage_named(name: &'static str) -> StageRef {
    if name == MERGE_STAGE {
        Arc::new(MergeStage)
    } else {
        Arc::new(FnStage::new(name, |ctx, next| next.run(ctx)))
    }
}

fn mutation() -> impl Strategy<Value = Mutation> {
    let name = prop::sample::select(vec!["merge", "model", "audit", "trace"]);
    prop_oneof![
        name.clone().prop_map(Mutation::Push),
        name.clone().prop_map(Mutation::PushFront),
        (0..6_usize, name.clone()).prop_map(|(i, n)| Mutation::Insert(i, n)),
        name.prop_map(Mutation::Remove),
        Just(Mutation::Reverse),
    ]
}

fn apply(chain: &mut BuildChain, mutation: &Mutation) {
    let stages = chain.stages_mut();
    match *mutation {
        Mutation::Push(name) => stages.push(stage_named(name)),
        Mutation::PushFront(name) => stages.insert(0, stage_named(name)),
        Mutation::Insert(index, name) => {
            let index = index.min(stages.len());
            stages.insert(index, stage_named(name));
        }
        Mutation::Remove(name) => stages.retain(|s| s.name() != name),
        Mutation::Reverse => stages.reverse(),
    }
}

proptest! {
    #[test]
    fn prop_merge_exactly_once_and_last(mutations in prop::collection::vec(mutation(), 0..20)) {
        let mut chain = BuildChain::new();
        for mutation in &mutations {
            apply(&mut chain, mutation);
        }

        let names = chain.stage_names();
        prop_assert_eq!(names.last().copied(), Some(MERGE_STAGE));
        prop_assert_eq!(names.iter().filter(|n| **n == MERGE_STAGE).count(), 1);

        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), names.len());

        // Reading again yields the same result.
        prop_assert_eq!(chain.stage_names(), names);
    }
}
