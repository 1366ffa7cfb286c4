use crate::error::NavError;
use crate::geometry::MapFrame;
use crate::nav::{CollisionLayer, NavGrid};

/// Owner of the active map's navigation grid.
///
/// The grid exists between [`LevelContext::install`] and
/// [`LevelContext::clear`]; querying outside that window yields
/// [`NavError::NotReady`]. Each install bumps the generation so results
/// computed against an older grid can be recognised and dropped.
#[derive(Clone, Debug, Default)]
pub struct LevelContext {
    grid: Option<NavGrid>,
    frame: MapFrame,
    generation: u64,
}

impl LevelContext {
    pub fn new(frame: MapFrame) -> Self {
        Self {
            grid: None,
            frame,
            generation: 0,
        }
    }

    /// Builds a grid from `layers` and installs it. On error the previous
    /// grid is dropped.
    pub fn rebuild<L: CollisionLayer>(
        &mut self,
        layers: &[L],
        width: u32,
        height: u32,
        frame: MapFrame,
    ) -> Result<u64, NavError> {
        self.grid = None;
        let grid = NavGrid::build(layers, width, height)?;
        Ok(self.install(grid, frame))
    }

    /// Installs an already-built grid and returns the new generation.
    pub fn install(&mut self, grid: NavGrid, frame: MapFrame) -> u64 {
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            width = grid.width(),
            height = grid.height(),
            "navigation grid installed"
        );
        self.grid = Some(grid);
        self.frame = frame;
        self.generation
    }

    pub fn clear(&mut self) {
        if self.grid.take().is_some() {
            tracing::info!(generation = self.generation, "navigation grid dropped");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.grid.is_some()
    }

    pub fn grid(&self) -> Result<&NavGrid, NavError> {
        self.grid.as_ref().ok_or(NavError::NotReady)
    }

    /// Mutable access for explicit walkability patches.
    pub fn grid_mut(&mut self) -> Result<&mut NavGrid, NavError> {
        self.grid.as_mut().ok_or(NavError::NotReady)
    }

    pub fn frame(&self) -> &MapFrame {
        &self.frame
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{TileCoord, WorldPos};
    use crate::nav::{CollisionRule, MapDimensions, TileLayer};

    #[test]
    fn grid_is_not_ready_until_installed() {
        let mut level = LevelContext::default();
        assert_eq!(level.grid().unwrap_err(), NavError::NotReady);

        let generation = level.install(NavGrid::open(4, 4).unwrap(), MapFrame::default());
        assert_eq!(generation, 1);
        assert!(level.grid().is_ok());

        level.clear();
        assert!(!level.is_ready());
        assert_eq!(level.grid_mut().unwrap_err(), NavError::NotReady);
    }

    #[test]
    fn rebuild_bumps_generation_and_drops_on_error() {
        let mut level = LevelContext::default();
        let dims = MapDimensions::new(3, 3);
        let mut walls = TileLayer::empty("walls", dims, CollisionRule::ids([1]));
        walls.set_tile(TileCoord::new(1, 1), 1);
        let frame = MapFrame::new(WorldPos::new(8.0, 8.0), 32.0);

        assert_eq!(level.rebuild(&[&walls], 3, 3, frame), Ok(1));
        assert!(!level.grid().unwrap().is_walkable(TileCoord::new(1, 1)));
        assert_eq!(level.frame(), &frame);

        let err = level.rebuild(&[&walls], 4, 4, frame).unwrap_err();
        assert!(matches!(err, NavError::LayerSizeMismatch { .. }));
        assert!(!level.is_ready());
        assert_eq!(level.generation(), 1);
    }
}
