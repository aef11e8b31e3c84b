use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    collections::{HashMap, VecDeque},
    io,
    time::{Duration, Instant},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, Paragraph, Row, Table},
    Frame, Terminal,
};

use waycue::diagnostics::Readout;
use waycue::engine::{EngineHandle, EngineOutput};
use waycue::geometry::LocalPlane;
use waycue::gui::GuideGuiError;
use waycue::location::Location;

/// Chart half width, in meters.
const CHART_RANGE: f64 = 20.0;
const SPOKEN_HISTORY: usize = 8;

pub struct LandmarkInfo {
    pub title: String,
    pub location: Location,
}

struct App {
    handle: EngineHandle,
    landmarks: HashMap<String, LandmarkInfo>,
    last: Option<Readout>,
    /// Nearest first, one row per landmark.
    distances: Vec<(String, f64)>,
    spoken: VecDeque<String>,
    active: bool,
}

impl App {
    fn new(handle: EngineHandle, landmarks: HashMap<String, LandmarkInfo>) -> App {
        App {
            handle,
            landmarks,
            last: None,
            distances: vec![],
            spoken: VecDeque::new(),
            active: true,
        }
    }

    fn on_tick(&mut self) {
        let outputs: Vec<EngineOutput> = self.handle.outputs().try_iter().collect();
        for output in outputs {
            if let EngineOutput::Readout(readout) = output {
                self.absorb(readout);
            }
        }
    }

    fn absorb(&mut self, readout: Readout) {
        if readout.evaluated {
            let mut distances: Vec<(String, f64)> = Vec::new();
            for (id, d) in &readout.distances {
                match distances.iter_mut().find(|(seen, _)| seen == id) {
                    Some(entry) => entry.1 = entry.1.min(*d),
                    None => distances.push((id.clone(), *d)),
                }
            }
            distances.sort_by(|a, b| a.1.total_cmp(&b.1));
            self.distances = distances;
        }
        for phrase in &readout.phrases {
            if self.spoken.len() == SPOKEN_HISTORY {
                self.spoken.pop_front();
            }
            self.spoken.push_back(phrase.text.clone());
        }
        self.last = Some(readout);
    }

    fn toggle_active(&mut self) -> Result<(), GuideGuiError> {
        self.active = !self.active;
        self.handle.set_active(self.active)?;
        Ok(())
    }

    /// Landmarks around the user, in meters east and north of them.
    fn chart_points(&self) -> Vec<(f64, f64)> {
        let Some(here) = self.last.as_ref().map(|r| r.location).filter(Location::is_valid) else {
            return vec![];
        };
        let plane = LocalPlane::new(here.lat, here.lng);
        self.distances
            .iter()
            .filter_map(|(id, _)| self.landmarks.get(id))
            .map(|info| plane.project(info.location.lat, info.location.lng))
            .map(|p| (p.x, p.y))
            .collect()
    }
}

pub fn engage_gui(
    handle: EngineHandle,
    landmarks: HashMap<String, LandmarkInfo>,
) -> Result<EngineHandle, GuideGuiError> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(250);
    let mut app = App::new(handle, landmarks);
    let res = run_app(&mut terminal, &mut app, tick_rate);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map(|_| app.handle)
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<(), GuideGuiError> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('a') => app.toggle_active()?,
                        KeyCode::Char('f') => app.handle.announce_floor()?,
                        _ => {}
                    }
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn readout_lines(app: &App) -> Vec<Line<'static>> {
    let Some(r) = &app.last else {
        return vec![Line::from("waiting for a location...")];
    };
    let l = &r.location;
    vec![
        Line::from(format!(
            "lat {:.7}  lng {:.7}  floor {:.1} (committed {})",
            l.lat,
            l.lng,
            l.floor,
            r.floor.map_or_else(|| "-".to_owned(), |f| f.to_string())
        )),
        Line::from(format!(
            "speed {:.2}  accuracy {:.1}  orientation {:.0} ±{:.0}",
            l.speed, l.accuracy, l.orientation, l.orientation_accuracy
        )),
        Line::from(vec![
            Span::raw("guidance "),
            if app.active {
                Span::styled("on", Style::default().fg(Color::Green))
            } else {
                Span::styled("off", Style::default().fg(Color::Red))
            },
            Span::raw("   <a> toggle  <f> announce floor  <q> quit"),
        ]),
    ]
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(SPOKEN_HISTORY as u16 + 2),
        ])
        .split(f.size());
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let readout = Paragraph::new(readout_lines(app))
        .block(Block::default().title(" Location ").borders(Borders::ALL));
    f.render_widget(readout, rows[0]);

    let table_rows = app.distances.iter().map(|(id, d)| {
        let title = app.landmarks.get(id).map_or(id.as_str(), |info| info.title.as_str());
        Row::new(vec![
            Cell::from(id.clone()),
            Cell::from(title.to_owned()),
            Cell::from(format!("{d:.1} m")),
        ])
    });
    let table = Table::new(
        table_rows,
        [Constraint::Length(10), Constraint::Min(10), Constraint::Length(10)],
    )
    .header(Row::new(vec!["id", "landmark", "distance"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().title(" Distances ").borders(Borders::ALL));
    f.render_widget(table, middle[0]);

    let points = app.chart_points();
    let me = [(0.0, 0.0)];
    let labels = || {
        ["-20", "0", "20"]
            .iter()
            .cloned()
            .map(Span::from)
            .collect::<Vec<_>>()
    };
    let chart = Chart::new(vec![
        Dataset::default()
            .name("Landmarks")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&points),
        Dataset::default()
            .name("You")
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&me),
    ])
    .block(Block::default().title(" Around you ").borders(Borders::ALL))
    .x_axis(
        Axis::default()
            .title(Span::styled("east (m)", Style::default().fg(Color::Red)))
            .style(Style::default().fg(Color::White))
            .bounds([-CHART_RANGE, CHART_RANGE])
            .labels(labels()),
    )
    .y_axis(
        Axis::default()
            .title(Span::styled("north (m)", Style::default().fg(Color::Red)))
            .style(Style::default().fg(Color::White))
            .bounds([-CHART_RANGE, CHART_RANGE])
            .labels(labels()),
    );
    f.render_widget(chart, middle[1]);

    let spoken = List::new(app.spoken.iter().map(String::as_str))
        .block(Block::default().title(" Spoken ").borders(Borders::ALL));
    f.render_widget(spoken, rows[2]);
}
