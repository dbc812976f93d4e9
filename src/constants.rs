/// Default tuning for the score envelope, hue aggregation, spawning and the
/// ambient particle field.
///
/// Named profiles in `profile.rs` start from these values. Frame-based
/// quantities assume a ~60 Hz render loop.
// Score envelope
pub const SCORE_BOOST: f32 = 10.0; // global gain on raw classifier confidence
pub const ATTACK: f32 = 0.9; // lerp factor toward a higher boosted target
pub const DECAY: f32 = 0.98; // per-frame multiplicative fall otherwise
pub const MODULATION_FACTOR: f32 = 10.0; // sentinel score -> group multiplier slope

// Hue aggregation
pub const ACTIVE_EPS: f32 = 0.01; // group sum above this contributes a hue
pub const ACTIVE_THRESHOLD: f32 = 0.1; // group sum above this counts toward balanced mode
pub const MIN_ACTIVE_GROUPS: usize = 3;
pub const HUE_SMOOTH: f32 = 0.1;
pub const INITIAL_HUE: f32 = 210.0;
pub const SPECIES_THRESHOLD: f32 = 0.1; // any label above this makes its group a species source

// Instantaneous spawning
pub const SCORE_DISPLAY_MAX: f32 = 0.3; // current score mapped to display 1.0
pub const DETECTION_THRESHOLD: f32 = 0.3; // display score needed to spawn
pub const COOLDOWN_FRAMES: u32 = 30;

// Time-windowed stamps
pub const WINDOW_SECONDS: f64 = 5.0;
pub const STAMP_THRESHOLD: f32 = 0.05; // window averages at or below this are dropped
pub const STAMP_Y_TOP: f32 = 0.25;
pub const STAMP_Y_BOTTOM: f32 = 0.75;
pub const STAMP_Y_SEPARATION: f32 = 0.1;
pub const STAMP_TIME_NEIGHBORHOOD_SEC: f64 = 2.0;
pub const STAMP_PLACEMENT_ATTEMPTS: usize = 10;
pub const STAMP_SIZE_MIN: f32 = 10.0;
pub const STAMP_SIZE_MAX: f32 = 100.0;
pub const STAMP_JITTER_MIN_PX: f32 = -20.0;
pub const STAMP_JITTER_MAX_PX: f32 = 80.0;
pub const RIPPLE_GROWTH_PX: f32 = 2.0;
pub const RIPPLE_RADIUS_FACTOR: f32 = 2.0; // ripple max radius relative to stamp size
pub const RIPPLE_ALPHA_MAX: f32 = 0.6;

// Spectral energy
pub const BAND_ENERGY_MAX: f32 = 255.0;
pub const BASS_SILENCE_DECAY: f32 = 0.95; // raw level decay per frame when no spectrum arrives
pub const BASS_REF: f32 = 1.5; // smoothed level at which particles reach full speed
pub const WAVEFORM_SMOOTHING: f32 = 0.1;

// Ambient particle field
pub const PARTICLE_COUNT: usize = 120;
pub const VEL_SMOOTH: f32 = 0.1;
pub const PUSH_COEF: f32 = 0.5; // radial push per unit of smoothed bass
pub const SPEED_MULTIPLIER_MAX: f32 = 2.0;
pub const PARTICLE_LIFESPAN_MIN: f32 = 300.0;
pub const PARTICLE_LIFESPAN_MAX: f32 = 600.0;
pub const BASE_SPEED: f32 = 0.5; // drift velocity components are drawn from ±BASE_SPEED
pub const HUE_CHANGE_MIN: f32 = 0.05;
pub const HUE_CHANGE_MAX: f32 = 0.1;
pub const HUE_OFFSET_SPREAD: f32 = 15.0;
pub const ESCAPE_FACTOR: f32 = 1.5; // reset once farther than bounds * factor

// Species behaviour
pub const FLOCK_RADIUS: f32 = 300.0;
pub const FLOCK_BLEND: f32 = 0.05;
pub const WATER_SINK: f32 = 0.01;
pub const WATER_RELAX: f32 = 0.02;
pub const WIND_STRENGTH: f32 = 0.1;
pub const WIND_NOISE_SCALE: f32 = 0.01;
pub const WIND_SPEED_LIMIT: f32 = 1.0;
pub const PULSE_RATE: f32 = 0.2;
pub const PULSE_DEPTH: f32 = 0.01;
pub const MACHINE_SPEED_MIN: f32 = 1.0;
pub const MACHINE_SPEED_MAX: f32 = 3.0;

// Transient entities
pub const ICON_LIFESPAN: f32 = 400.0;
pub const FADE_FRAMES: f32 = 100.0; // alpha ramps down over the last frames of life
pub const CONNECT_DISTANCE: f32 = 100.0;
pub const CONNECTOR_ALPHA_MIN: f32 = 0.1;
pub const BURST_SPEED_MIN: f32 = 8.0;
pub const BURST_SPEED_MAX: f32 = 15.0;
pub const BURST_LIFESPAN_MIN: f32 = 200.0;
pub const BURST_LIFESPAN_MAX: f32 = 300.0;
pub const BURST_WIND_LIMIT: f32 = 2.0;
