//! The cached document always equals the replay of committed history,
//! whatever mix of commits, failed commits, enqueues and undos got it there.

use formflow_core::{LoadedStep, Operation, Template, TemplateRef};
use formflow_engine::Conversation;
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Move {
    Add(String, i64),
    Replace(String, i64),
    Remove(String),
    Complete,
    Enqueue(usize),
    Undo,
}

fn arb_key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d~1e"]).prop_map(str::to_string)
}

fn arb_move() -> impl Strategy<Value = Move> {
    prop_oneof![
        (arb_key(), any::<i64>()).prop_map(|(key, n)| Move::Add(key, n)),
        (arb_key(), any::<i64>()).prop_map(|(key, n)| Move::Replace(key, n)),
        arb_key().prop_map(Move::Remove),
        Just(Move::Complete),
        (1usize..3).prop_map(Move::Enqueue),
        Just(Move::Undo),
    ]
}

fn step(path: String) -> LoadedStep {
    LoadedStep::new(TemplateRef::diff(path.clone()), Template::new(path))
}

proptest! {
    #[test]
    fn document_matches_replay(moves in prop::collection::vec(arb_move(), 0..40)) {
        let declared: Vec<LoadedStep> = (0..8).map(|i| step(format!("declared/{i}"))).collect();
        let mut conversation = Conversation::new(json!({"seed": true}));
        let mut generated = 0;

        for next in moves {
            let before = conversation.clone();
            let outcome = match next {
                Move::Add(key, n) => conversation
                    .commit(&declared, vec![Operation::add(format!("/{key}"), json!(n))])
                    .map(|_| ()),
                Move::Replace(key, n) => conversation
                    .commit(&declared, vec![Operation::replace(format!("/{key}"), json!(n))])
                    .map(|_| ()),
                Move::Remove(key) => conversation
                    .commit(&declared, vec![Operation::remove(format!("/{key}"))])
                    .map(|_| ()),
                Move::Complete => conversation.commit(&declared, Vec::new()).map(|_| ()),
                Move::Enqueue(count) => {
                    let steps: Vec<LoadedStep> = (0..count)
                        .map(|i| step(format!("generated/{}", generated + i)))
                        .collect();
                    generated += count;
                    conversation.enqueue(steps);
                    Ok(())
                }
                Move::Undo => conversation.undo_last().map(|_| ()),
            };

            if outcome.is_err() {
                prop_assert_eq!(&conversation, &before);
            }
            prop_assert!(conversation.verify());
            prop_assert!(conversation.committed().len() <= before.committed().len() + 1);
        }
    }
}
