use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use crew_core::headless_session;
use crew_proto::{DeadPlayer, GameStatus, PlayerCard, Role, Snapshot, TaskItem, TaskLists};

fn crowded_snapshot(players: usize) -> Snapshot {
    let card = |i: usize| PlayerCard {
        id: format!("p{i}"),
        name: format!("Player {i}"),
        avatar: String::new(),
    };
    Snapshot {
        status: GameStatus::InGame,
        role: Some(Role::Impostor),
        kill_remaining: 15,
        tasks: TaskLists {
            common: (0..players)
                .map(|i| TaskItem {
                    id: format!("common:{i}"),
                    name: format!("Task {i}"),
                    done: i % 2 == 0,
                })
                .collect(),
            ..TaskLists::default()
        },
        kill_targets: (0..players).map(card).collect(),
        dead_players: (0..players)
            .map(|i| DeadPlayer {
                id: format!("d{i}"),
                reported: i % 3 == 0,
                ..DeadPlayer::default()
            })
            .collect(),
        ..Snapshot::default()
    }
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_snapshot");

    for players in [4usize, 10, 15, 64] {
        let snapshot = crowded_snapshot(players);
        group.bench_with_input(BenchmarkId::new("players", players), &snapshot, |b, snapshot| {
            b.iter_batched(
                headless_session,
                |mut session| {
                    session.apply_snapshot(snapshot);
                    session.frame()
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(apply_benches, bench_apply);
criterion_main!(apply_benches);
