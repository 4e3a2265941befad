// Plays a game of random moves and prints the board after each of them

use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use stormchess::{board::PrettyStyle, Board, Color, Coord, Game, GameStatus, PieceId, PieceKind};

fn variant_board() -> Board {
    let mut board = Board::standard();
    for color in [Color::White, Color::Black] {
        let y = stormchess::geometry::back_row(color);
        for (x, kind) in [(1, PieceKind::Sniper), (6, PieceKind::Caster)] {
            let c = Coord::from_parts(x, y);
            board.remove_piece(c);
            board.add_piece(color, kind, c);
        }
    }
    board
}

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42_u64);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut game = Game::from_board(variant_board(), Color::White);

    for ply in 1..=200 {
        if let GameStatus::Finished(outcome) = game.status() {
            println!("Game finished: {}", outcome);
            return;
        }
        let turn = game.turn();
        let moves: Vec<(PieceId, Coord)> = game
            .board()
            .pieces()
            .filter(|(_, p)| p.color() == turn)
            .flat_map(|(id, p)| p.moves().iter().map(move |&dst| (id, dst)))
            .collect();
        let Some(&(id, dst)) = moves.choose(&mut rng) else {
            println!("{} has no moves, offering a tie", turn);
            game.force_tie();
            continue;
        };

        let kind = game.board().piece(id).map(|p| p.kind());
        let report = game.try_move(id, dst).unwrap();
        println!(
            "{}. {} {} -> {} ({:?}, {} captured)",
            ply,
            kind.unwrap(),
            id,
            dst,
            report.kind,
            report.victims.len()
        );
        if let Some(side) = report.check {
            println!("Check to {}", side);
        }
        println!("{}", game.board().pretty(PrettyStyle::Utf8));
    }
    if let Some(outcome) = game.outcome() {
        println!("Game finished: {}", outcome);
    } else {
        println!("Stopped after 200 moves");
    }
}
