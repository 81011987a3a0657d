use core_grid::{CursorPos, Grid};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Goto(usize, usize),
    Put(String),
    EolClear,
    Clear,
    Scroll(i64),
    Region(usize, usize, usize, usize),
    Resize(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..40, 0usize..120).prop_map(|(r, c)| Op::Goto(r, c)),
        "[a-z界 ]{0,12}".prop_map(Op::Put),
        Just(Op::EolClear),
        Just(Op::Clear),
        (-30i64..30).prop_map(Op::Scroll),
        (0usize..40, 0usize..40, 0usize..120, 0usize..120)
            .prop_map(|(t, b, l, r)| Op::Region(t, b, l, r)),
        (0usize..30, 0usize..100).prop_map(|(r, c)| Op::Resize(r, c)),
    ]
}

fn apply(g: &mut Grid, op: &Op) {
    match op {
        Op::Goto(r, c) => g.cursor_goto(*r, *c),
        Op::Put(s) => g.put(s),
        Op::EolClear => g.eol_clear(),
        Op::Clear => g.clear(),
        Op::Scroll(n) => g.scroll(*n),
        Op::Region(t, b, l, r) => g.set_scroll_region(*t, *b, *l, *r),
        Op::Resize(r, c) => g.resize(*r, *c),
    }
}

proptest! {
    #[test]
    fn cursor_and_region_stay_inside_grid(ops in prop::collection::vec(op(), 1..60)) {
        let mut g = Grid::new(24, 80);
        for op in &ops {
            apply(&mut g, op);
            let cur = g.cursor();
            prop_assert!(cur.row < g.rows());
            prop_assert!(cur.col < g.cols());
            let region = g.scroll_region();
            prop_assert!(region.top <= region.bottom && region.bottom < g.rows());
            prop_assert!(region.left <= region.right && region.right < g.cols());
            prop_assert!(g.get_cell(g.rows() - 1, g.cols() - 1).is_ok());
            prop_assert!(g.get_cell(g.rows(), 0).is_err());
            prop_assert!(g.get_cell(0, g.cols()).is_err());
        }
    }

    #[test]
    fn narrow_puts_advance_one_column_each(start in 0usize..40, n in 0usize..40) {
        let mut g = Grid::new(2, 80);
        g.cursor_goto(1, start);
        for _ in 0..n {
            g.put("x");
        }
        prop_assert_eq!(g.cursor(), CursorPos::new(1, (start + n).min(79)));
    }

    #[test]
    fn resize_yields_blank_corner(rows in 1usize..50, cols in 1usize..200) {
        let mut g = Grid::new(10, 10);
        g.put("hello");
        g.resize(rows, cols);
        prop_assert!(g.get_cell(rows - 1, cols - 1).unwrap().is_blank());
        prop_assert!(g.get_cell(rows, cols - 1).is_err());
    }
}

#[test]
fn scroll_round_trip_restores_all_but_vacated_row() {
    let mut g = Grid::new(4, 3);
    for (row, text) in ["r0", "r1", "r2", "r3"].iter().enumerate() {
        g.cursor_goto(row, 0);
        g.put(text);
    }
    g.scroll(1);
    assert_eq!(g.snapshot_text(), vec!["r1", "r2", "r3", ""]);
    g.scroll(-1);
    assert_eq!(g.snapshot_text(), vec!["", "r1", "r2", "r3"]);
}
