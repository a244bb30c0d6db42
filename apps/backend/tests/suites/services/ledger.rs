use std::collections::BTreeSet;
use std::sync::Arc;

use coinche_backend::domain::{Card, SeatAlias, Team};
use coinche_backend::repos::ledger::{NewPlay, PlayKey, PlayedCardLedger, TrickStrictness};
use coinche_backend::store::MemoryStore;

const CARDS: [(SeatAlias, &str); 4] = [
    (SeatAlias::Nord, "heartK"),
    (SeatAlias::Sud, "heartA"),
    (SeatAlias::Est, "heart7"),
    (SeatAlias::Ouest, "diamond9"),
];

fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for (i, first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, *first);
            out.push(tail);
        }
    }
    out
}

fn play(session_id: &str, seat: SeatAlias, card: &str) -> NewPlay {
    let card = Card::from_id(card).expect("valid card id");
    NewPlay {
        key: PlayKey {
            session_id: session_id.to_string(),
            round: 1,
            seat,
            sequence: 1,
        },
        card,
        card_presentation: card.presentation(),
        player_id: format!("p{seat}"),
        player_name: seat.to_string(),
        message: String::new(),
    }
}

#[tokio::test]
async fn collected_trick_ignores_play_order() -> Result<(), Box<dyn std::error::Error>> {
    let expected: BTreeSet<String> = CARDS.iter().map(|(_, card)| card.to_string()).collect();
    let orders = permutations(&[0, 1, 2, 3]);
    assert_eq!(orders.len(), 24);

    for (n, order) in orders.iter().enumerate() {
        let ledger = PlayedCardLedger::new(Arc::new(MemoryStore::new()), TrickStrictness::default());
        let sid = format!("perm{n}");
        for &i in order {
            let (seat, card) = CARDS[i];
            ledger.record_play(play(&sid, seat, card)).await?;
        }

        let collected = ledger.collect_trick(&sid, 1, Team::EstOuest, 1).await?;
        let seats: Vec<SeatAlias> = collected.slots.iter().map(|slot| slot.seat).collect();
        assert_eq!(seats, SeatAlias::ALL.to_vec(), "order {order:?}");

        let stored = ledger.trick_record(&sid, 1, Team::EstOuest).await?;
        let cards: BTreeSet<String> = stored.cards().iter().map(Card::id).collect();
        assert_eq!(cards, expected, "order {order:?}");
    }
    Ok(())
}

#[tokio::test]
async fn repeated_pickup_does_not_duplicate() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = PlayedCardLedger::new(Arc::new(MemoryStore::new()), TrickStrictness::Permissive);
    for (seat, card) in CARDS {
        ledger.record_play(play("twice", seat, card)).await?;
    }

    ledger.collect_trick("twice", 1, Team::NordSud, 1).await?;
    ledger.collect_trick("twice", 1, Team::NordSud, 1).await?;

    let stored = ledger.trick_record("twice", 1, Team::NordSud).await?;
    assert_eq!(stored.slots.len(), 4);
    assert!(ledger
        .trick_record("twice", 1, Team::EstOuest)
        .await?
        .slots
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn pickups_of_successive_tricks_accumulate() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = PlayedCardLedger::new(Arc::new(MemoryStore::new()), TrickStrictness::Permissive);
    for (seat, card) in CARDS {
        ledger.record_play(play("many", seat, card)).await?;
        let mut second = play("many", seat, "club8");
        second.key.sequence = 2;
        ledger.record_play(second).await?;
    }

    ledger.collect_trick("many", 1, Team::NordSud, 1).await?;
    ledger.collect_trick("many", 1, Team::NordSud, 2).await?;

    let stored = ledger.trick_record("many", 1, Team::NordSud).await?;
    assert_eq!(stored.slots.len(), 8);
    assert_eq!(stored.slots.iter().filter(|slot| slot.sequence == 2).count(), 4);
    Ok(())
}
