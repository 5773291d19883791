//! Per-caller context: color database, progress monitor and temporary names
use crate::{ColorLookup, Fill, NamedColors, Pixel, PixelGridMut, Result};
use std::fmt;

/// Prefix of names handed out by `Session::temp_name`
pub const TEMP_NAME_PREFIX: &str = "mpri:";

/// Progress callback invoked with `(operation, done, total)`
pub type Monitor = Box<dyn FnMut(&str, usize, usize)>;

pub struct Session {
    lookup: Box<dyn ColorLookup>,
    temp_counter: u64,
    monitor: Option<Monitor>,
}

impl Session {
    pub fn new(lookup: impl ColorLookup + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            temp_counter: 0,
            monitor: None,
        }
    }

    pub fn lookup(&self) -> &dyn ColorLookup {
        self.lookup.as_ref()
    }

    /// Resolve color name or hex notation through the session color database
    pub fn pixel(&self, name: &str) -> Result<Pixel> {
        Pixel::from_name(name, self.lookup.as_ref())
    }

    /// Unique name for a temporary image, `mpri:0`, `mpri:1`, ...
    pub fn temp_name(&mut self) -> String {
        let name = format!("{}{}", TEMP_NAME_PREFIX, self.temp_counter);
        self.temp_counter += 1;
        name
    }

    /// Install progress monitor, returning the previous one
    pub fn set_monitor<F>(&mut self, monitor: F) -> Option<Monitor>
    where
        F: FnMut(&str, usize, usize) + 'static,
    {
        self.monitor.replace(Box::new(monitor))
    }

    pub fn clear_monitor(&mut self) -> Option<Monitor> {
        self.monitor.take()
    }

    /// Run fill over the grid, reporting each committed row to the monitor
    pub fn fill(&mut self, fill: &dyn Fill, grid: &mut dyn PixelGridMut) -> Result<()> {
        match self.monitor.as_mut() {
            None => fill.fill(grid),
            Some(monitor) => fill.fill_with(grid, &mut |row, rows| monitor("fill", row, rows)),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(NamedColors)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("temp_counter", &self.temp_counter)
            .field("monitor", &self.monitor.is_some())
            .finish()
    }
}
