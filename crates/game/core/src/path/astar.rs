use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{BlockedEndpoint, CARDINAL_COST, DIAGONAL_COST, Path, PathError, PathOptions};
use crate::geometry::{Direction, TileCoord};
use crate::nav::NavGrid;

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const UNVISITED: usize = usize::MAX;

/// Shortest path from `start` to `goal`, or an empty path on any failure.
pub fn find_path(grid: &NavGrid, start: TileCoord, goal: TileCoord, options: &PathOptions) -> Path {
    plan(grid, start, goal, options).unwrap_or_default()
}

/// Shortest path from `start` to `goal`.
///
/// Both endpoints are clamped into the grid first. `start == goal` yields an
/// empty path. When [`BlockedEndpoint::Nearest`] substitutes a blocked start,
/// the substitute is the first step of the returned path.
pub fn plan(
    grid: &NavGrid,
    start: TileCoord,
    goal: TileCoord,
    options: &PathOptions,
) -> Result<Path, PathError> {
    let requested_start = grid.clamp(start);
    let start = resolve_endpoint(grid, requested_start, options.blocked_endpoint)
        .ok_or(PathError::BlockedStart(requested_start))?;
    let requested_goal = grid.clamp(goal);
    let goal = resolve_endpoint(grid, requested_goal, options.blocked_endpoint)
        .ok_or(PathError::BlockedGoal(requested_goal))?;

    let mut steps = if start == goal {
        Vec::new()
    } else {
        search(grid, start, goal, options)?
    };
    if start != requested_start {
        steps.insert(0, start);
    }
    Ok(Path::new(steps))
}

fn resolve_endpoint(grid: &NavGrid, tile: TileCoord, policy: BlockedEndpoint) -> Option<TileCoord> {
    if grid.is_walkable(tile) {
        return Some(tile);
    }
    match policy {
        BlockedEndpoint::Fail => None,
        BlockedEndpoint::Nearest => grid.nearest_walkable(tile),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    order: u32,
    index: usize,
}

impl Ord for OpenNode {
    // Min-heap on f, then h, then insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: TileCoord, to: TileCoord, allow_diagonal: bool) -> u32 {
    let dx = from.col.abs_diff(to.col);
    let dy = from.row.abs_diff(to.row);
    if allow_diagonal {
        let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
        CARDINAL_COST * long + (DIAGONAL_COST - CARDINAL_COST) * short
    } else {
        CARDINAL_COST * (dx + dy)
    }
}

fn search(
    grid: &NavGrid,
    start: TileCoord,
    goal: TileCoord,
    options: &PathOptions,
) -> Result<Vec<TileCoord>, PathError> {
    let dims = grid.dimensions();
    let (Some(start_index), Some(goal_index)) = (dims.index_of(start), dims.index_of(goal)) else {
        return Err(PathError::Unreachable { start, goal });
    };

    let area = dims.area();
    let mut g_score = vec![u32::MAX; area];
    let mut parent = vec![UNVISITED; area];
    let mut closed = vec![false; area];
    let mut open = BinaryHeap::new();
    let mut order = 0u32;
    let mut expansions = 0u32;

    g_score[start_index] = 0;
    let h = heuristic(start, goal, options.allow_diagonal);
    open.push(OpenNode {
        f: h,
        h,
        order,
        index: start_index,
    });

    while let Some(node) = open.pop() {
        if closed[node.index] {
            continue;
        }
        if node.index == goal_index {
            return Ok(reconstruct(&parent, goal_index, start_index, |i| dims.tile_of(i)));
        }
        closed[node.index] = true;

        expansions += 1;
        if let Some(limit) = options.max_expansions {
            if expansions > limit {
                tracing::debug!(%start, %goal, limit, "path search budget exhausted");
                return Err(PathError::BudgetExhausted { limit });
            }
        }

        let current = dims.tile_of(node.index);
        let current_g = g_score[node.index];

        for (next, cost) in successors(grid, current, options) {
            let Some(next_index) = dims.index_of(next) else {
                continue;
            };
            if closed[next_index] {
                continue;
            }
            let tentative = current_g + cost;
            if tentative < g_score[next_index] {
                g_score[next_index] = tentative;
                parent[next_index] = node.index;
                order += 1;
                let h = heuristic(next, goal, options.allow_diagonal);
                open.push(OpenNode {
                    f: tentative + h,
                    h,
                    order,
                    index: next_index,
                });
            }
        }
    }

    Err(PathError::Unreachable { start, goal })
}

fn successors(
    grid: &NavGrid,
    tile: TileCoord,
    options: &PathOptions,
) -> impl Iterator<Item = (TileCoord, u32)> {
    let cardinal = Direction::ALL
        .into_iter()
        .map(move |direction| tile.step(direction))
        .filter(move |next| grid.is_walkable(*next))
        .map(|next| (next, CARDINAL_COST));

    let allow_diagonal = options.allow_diagonal;
    let corner_policy = options.corner_policy;
    let diagonal = DIAGONALS
        .into_iter()
        .filter(move |_| allow_diagonal)
        .filter_map(move |(dc, dr)| {
            let next = tile.offset(dc, dr);
            let horizontal_open = grid.is_walkable(tile.offset(dc, 0));
            let vertical_open = grid.is_walkable(tile.offset(0, dr));
            (grid.is_walkable(next) && corner_policy.permits(horizontal_open, vertical_open))
                .then_some((next, DIAGONAL_COST))
        });

    cardinal.chain(diagonal)
}

fn reconstruct(
    parent: &[usize],
    goal_index: usize,
    start_index: usize,
    tile_of: impl Fn(usize) -> TileCoord,
) -> Vec<TileCoord> {
    let mut steps = Vec::new();
    let mut cursor = goal_index;
    while cursor != start_index && cursor != UNVISITED {
        steps.push(tile_of(cursor));
        cursor = parent[cursor];
    }
    steps.reverse();
    steps
}

#[cfg(test)]
mod tests {
    use std::cmp::Reverse;
    use std::collections::BTreeMap;

    use super::*;
    use crate::path::CornerPolicy;
    use crate::rng::{PcgRng, RngOracle, SeedContext, compute_seed};

    fn assert_legal_steps(start: TileCoord, path: &Path, grid: &NavGrid, options: &PathOptions) {
        let mut previous = start;
        for step in path {
            assert!(grid.is_walkable(*step), "{step} is blocked");
            assert!(previous.is_adjacent(*step), "{previous} -> {step} is not a unit step");
            let (dc, dr) = (step.col - previous.col, step.row - previous.row);
            if dc != 0 && dr != 0 {
                assert!(options.allow_diagonal, "{previous} -> {step} moves diagonally");
                let horizontal_open = grid.is_walkable(previous.offset(dc, 0));
                let vertical_open = grid.is_walkable(previous.offset(0, dr));
                match options.corner_policy {
                    CornerPolicy::Never => assert!(
                        horizontal_open && vertical_open,
                        "{previous} -> {step} cuts a corner"
                    ),
                    CornerPolicy::NoSqueeze => assert!(
                        horizontal_open || vertical_open,
                        "{previous} -> {step} squeezes between walls"
                    ),
                    CornerPolicy::Always => {}
                }
            }
            previous = *step;
        }
    }

    /// Grid with roughly `blocked_percent` of its cells blocked.
    fn scattered_grid(seed: u64, width: u32, height: u32, blocked_percent: u32) -> NavGrid {
        let rng = PcgRng;
        let mut grid = NavGrid::open(width, height).unwrap();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let cell = (row * width as i32 + col) as u64;
                let roll = rng.next_u32(compute_seed(seed, cell, 0, SeedContext::SpawnCell));
                if roll % 100 < blocked_percent {
                    grid.set_walkable(TileCoord::new(col, row), false);
                }
            }
        }
        grid
    }

    /// Plain Dijkstra over the movement rules, with no heuristic and no budget.
    fn cheapest_cost(
        grid: &NavGrid,
        start: TileCoord,
        goal: TileCoord,
        options: &PathOptions,
    ) -> Option<u32> {
        let mut best: BTreeMap<TileCoord, u32> = BTreeMap::from([(start, 0)]);
        let mut open = BinaryHeap::from([Reverse((0u32, start))]);

        while let Some(Reverse((cost, tile))) = open.pop() {
            if tile == goal {
                return Some(cost);
            }
            if best.get(&tile).is_some_and(|known| *known < cost) {
                continue;
            }
            for dc in -1..=1 {
                for dr in -1..=1 {
                    if (dc, dr) == (0, 0) {
                        continue;
                    }
                    let next = tile.offset(dc, dr);
                    if !grid.is_walkable(next) {
                        continue;
                    }
                    let step_cost = if dc != 0 && dr != 0 {
                        if !options.allow_diagonal {
                            continue;
                        }
                        let horizontal_open = grid.is_walkable(tile.offset(dc, 0));
                        let vertical_open = grid.is_walkable(tile.offset(0, dr));
                        let allowed = match options.corner_policy {
                            CornerPolicy::Never => horizontal_open && vertical_open,
                            CornerPolicy::NoSqueeze => horizontal_open || vertical_open,
                            CornerPolicy::Always => true,
                        };
                        if !allowed {
                            continue;
                        }
                        DIAGONAL_COST
                    } else {
                        CARDINAL_COST
                    };
                    let candidate = cost + step_cost;
                    if best.get(&next).is_none_or(|known| candidate < *known) {
                        best.insert(next, candidate);
                        open.push(Reverse((candidate, next)));
                    }
                }
            }
        }
        None
    }

    fn compare_with_exhaustive_search(options: PathOptions) -> (usize, usize) {
        let options = options.with_max_expansions(None);
        let rng = PcgRng;
        let (mut reachable, mut unreachable) = (0, 0);

        for layout in 0..40u64 {
            let grid = scattered_grid(layout, 12, 12, 35);
            let open: Vec<TileCoord> = (0..12)
                .flat_map(|row| (0..12).map(move |col| TileCoord::new(col, row)))
                .filter(|tile| grid.is_walkable(*tile))
                .collect();
            if open.len() < 2 {
                continue;
            }

            for pair in 0..10u64 {
                let pick = |slot| {
                    open[rng.pick(compute_seed(layout, pair, slot, SeedContext::SpawnCell), open.len())]
                };
                let (start, goal) = (pick(1), pick(2));
                if start == goal {
                    continue;
                }

                let path = find_path(&grid, start, goal, &options);
                match cheapest_cost(&grid, start, goal, &options) {
                    Some(cost) => {
                        reachable += 1;
                        assert_eq!(path.goal(), Some(goal), "layout {layout}: {start} -> {goal}");
                        assert_eq!(path.cost_from(start), cost, "layout {layout}: {start} -> {goal}");
                        assert_legal_steps(start, &path, &grid, &options);
                    }
                    None => {
                        unreachable += 1;
                        assert!(path.is_empty(), "layout {layout}: {start} -> {goal}");
                        assert_eq!(
                            plan(&grid, start, goal, &options),
                            Err(PathError::Unreachable { start, goal })
                        );
                    }
                }
            }
        }
        (reachable, unreachable)
    }

    #[test]
    fn cardinal_paths_match_exhaustive_search_on_scattered_grids() {
        let (reachable, unreachable) = compare_with_exhaustive_search(PathOptions::cardinal());
        assert!(reachable > 0);
        assert!(unreachable > 0);
    }

    #[test]
    fn diagonal_paths_match_exhaustive_search_on_scattered_grids() {
        for policy in [CornerPolicy::Never, CornerPolicy::NoSqueeze, CornerPolicy::Always] {
            let options = PathOptions::default().with_corner_policy(policy);
            let (reachable, unreachable) = compare_with_exhaustive_search(options);
            assert!(reachable > 0, "{policy}");
            if policy == CornerPolicy::Never {
                assert!(unreachable > 0);
            }
        }
    }

    #[test]
    fn open_grid_corner_to_corner_without_diagonals() {
        let grid = NavGrid::open(10, 10).unwrap();
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(9, 9);

        let path = find_path(&grid, start, goal, &PathOptions::cardinal());

        assert_eq!(path.len(), 18);
        assert!(matches!(
            path.first(),
            Some(TileCoord { col: 1, row: 0 }) | Some(TileCoord { col: 0, row: 1 })
        ));
        assert_eq!(path.goal(), Some(goal));
        assert_legal_steps(start, &path, &grid, &PathOptions::cardinal());
    }

    #[test]
    fn open_grid_with_diagonals_walks_straight_diagonal() {
        let grid = NavGrid::open(10, 10).unwrap();
        let start = TileCoord::new(0, 0);
        let path = find_path(&grid, start, TileCoord::new(9, 9), &PathOptions::default());

        assert_eq!(path.len(), 9);
        assert_eq!(path.cost_from(start), 9 * DIAGONAL_COST);
        assert_legal_steps(start, &path, &grid, &PathOptions::default());
    }

    #[test]
    fn routes_through_single_gap_in_wall() {
        let grid = NavGrid::from_ascii(
            "
            .....
            .....
            ####.
            .....
            .....
            ",
        )
        .unwrap();
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(0, 4);

        let path = find_path(&grid, start, goal, &PathOptions::cardinal());

        assert!(path.steps().contains(&TileCoord::new(4, 2)));
        assert_eq!(path.len(), 12);
        assert_eq!(path.goal(), Some(goal));
        assert_legal_steps(start, &path, &grid, &PathOptions::cardinal());
    }

    #[test]
    fn centered_gap_gives_eight_steps() {
        let grid = NavGrid::from_ascii(
            "
            .....
            .....
            ##.##
            .....
            .....
            ",
        )
        .unwrap();
        let path = find_path(
            &grid,
            TileCoord::new(0, 0),
            TileCoord::new(0, 4),
            &PathOptions::cardinal(),
        );
        assert_eq!(path.len(), 8);
        assert!(path.steps().contains(&TileCoord::new(2, 2)));
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let grid = NavGrid::from_ascii(
            "
            .......
            ..###..
            ..#.#..
            ..###..
            .......
            ",
        )
        .unwrap();
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(3, 2);

        assert!(find_path(&grid, start, goal, &PathOptions::default()).is_empty());
        assert_eq!(
            plan(&grid, start, goal, &PathOptions::default()),
            Err(PathError::Unreachable { start, goal })
        );
    }

    #[test]
    fn path_length_is_optimal_around_obstacle() {
        let grid = NavGrid::from_ascii(
            "
            ......
            .####.
            ......
            ",
        )
        .unwrap();
        let path = find_path(
            &grid,
            TileCoord::new(0, 1),
            TileCoord::new(5, 1),
            &PathOptions::cardinal(),
        );
        // Up, across five, down.
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn start_equal_to_goal_is_empty_success() {
        let grid = NavGrid::open(3, 3).unwrap();
        let tile = TileCoord::new(1, 1);
        assert_eq!(plan(&grid, tile, tile, &PathOptions::default()), Ok(Path::empty()));
    }

    #[test]
    fn out_of_bounds_endpoints_are_clamped() {
        let grid = NavGrid::open(4, 4).unwrap();
        let path = find_path(
            &grid,
            TileCoord::new(-5, -5),
            TileCoord::new(10, 0),
            &PathOptions::cardinal(),
        );
        assert_eq!(path.len(), 3);
        assert_eq!(path.goal(), Some(TileCoord::new(3, 0)));
    }

    #[test]
    fn blocked_goal_fails_by_default() {
        let grid = NavGrid::from_ascii("...\n..#\n...").unwrap();
        let goal = TileCoord::new(2, 1);
        let err = plan(&grid, TileCoord::new(0, 0), goal, &PathOptions::default()).unwrap_err();
        assert_eq!(err, PathError::BlockedGoal(goal));
    }

    #[test]
    fn blocked_goal_substitutes_nearest_when_requested() {
        let grid = NavGrid::from_ascii("...\n..#\n...").unwrap();
        let options = PathOptions::cardinal().with_blocked_endpoint(BlockedEndpoint::Nearest);
        let path = plan(&grid, TileCoord::new(0, 1), TileCoord::new(2, 1), &options).unwrap();
        assert!(!path.is_empty());
        let end = path.goal().unwrap();
        assert!(grid.is_walkable(end));
        assert_eq!(end.manhattan(TileCoord::new(2, 1)), 1);
    }

    #[test]
    fn blocked_start_substitute_is_first_step() {
        let grid = NavGrid::from_ascii("#..\n...\n...").unwrap();
        let options = PathOptions::cardinal().with_blocked_endpoint(BlockedEndpoint::Nearest);
        let path = plan(&grid, TileCoord::new(0, 0), TileCoord::new(2, 2), &options).unwrap();
        let first = path.first().unwrap();
        assert!(grid.is_walkable(first));
        assert_eq!(first.manhattan(TileCoord::new(0, 0)), 1);

        let strict = plan(&grid, TileCoord::new(0, 0), TileCoord::new(2, 2), &PathOptions::default());
        assert_eq!(strict, Err(PathError::BlockedStart(TileCoord::new(0, 0))));
    }

    #[test]
    fn corner_policy_controls_diagonal_squeeze() {
        // Diagonal from (0,0) to (1,1) passes between two walls.
        let grid = NavGrid::from_ascii(
            "
            .#
            #.
            ",
        )
        .unwrap();
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(1, 1);

        for policy in [CornerPolicy::Never, CornerPolicy::NoSqueeze] {
            let options = PathOptions::default().with_corner_policy(policy);
            assert!(find_path(&grid, start, goal, &options).is_empty(), "{policy}");
        }
        let options = PathOptions::default().with_corner_policy(CornerPolicy::Always);
        assert_eq!(find_path(&grid, start, goal, &options).len(), 1);
    }

    #[test]
    fn corner_policy_with_one_blocked_side() {
        let grid = NavGrid::from_ascii(
            "
            .#
            ..
            ",
        )
        .unwrap();
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(1, 1);

        let never = find_path(&grid, start, goal, &PathOptions::default());
        assert_eq!(never.len(), 2);

        let options = PathOptions::default().with_corner_policy(CornerPolicy::NoSqueeze);
        assert_eq!(find_path(&grid, start, goal, &options).len(), 1);
    }

    #[test]
    fn budget_bounds_search() {
        let grid = NavGrid::open(50, 50).unwrap();
        let options = PathOptions::cardinal().with_max_expansions(Some(5));
        let result = plan(&grid, TileCoord::new(0, 0), TileCoord::new(49, 49), &options);
        assert_eq!(result, Err(PathError::BudgetExhausted { limit: 5 }));

        let unlimited = PathOptions::cardinal().with_max_expansions(None);
        assert_eq!(
            find_path(&grid, TileCoord::new(0, 0), TileCoord::new(49, 49), &unlimited).len(),
            98
        );
    }
}
