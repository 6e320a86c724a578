extern crate getopts;
extern crate mikmod;
extern crate tracing_subscriber;

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::process;
use getopts::{Matches, Options};
use mikmod::driver;
use mikmod::{Interpolator, LoopBehavior, OutputChannels, PlayState, Player};
use tracing_subscriber::EnvFilter;

const BUFFER_FRAMES: usize = 2048;

fn main() {

    let args: Vec<String> = env::args().collect();
    let mut opts = Options::new();

    opts.optopt("o", "output", "write to the given file", "FILE");
    opts.optopt("d", "driver", "output driver", "DRIVER");
    opts.optopt("r", "rate", "sampling rate in Hz (default 44100)", "RATE");
    opts.optflag("m", "mono", "mono output");
    opts.optopt("i", "interpolation", "nearest or linear (default linear)", "INTERP");
    opts.optopt("l", "loop", "honor, stop or infinite (default honor)", "LOOP");
    opts.optopt("t", "time", "maximum playing time in seconds", "SECONDS");
    opts.optopt("V", "volume", "master volume 0-128 (default 128)", "VOLUME");
    opts.optflag("s", "show", "show module information and exit");
    opts.optflagmulti("v", "verbose", "verbose output, repeat for more detail");
    opts.optflag("h", "help", "display usage information and exit");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if matches.opt_present("h") || matches.free.is_empty() {
        let brief = format!("Usage: {} [options] filename", args[0]);
        print!("{}", opts.usage(&brief));
        println!("\nAvailable drivers:");
        for d in driver::list() {
            let file = if d.file { " (uses -o FILE)" } else { "" };
            println!("  {:8} {}{}", d.name, d.description, file);
        }
        return;
    }

    init_logging(matches.opt_count("v"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbosity: usize) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_env("MIKMOD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn engine_options(matches: &Matches) -> Result<mikmod::Options, Box<dyn Error>> {
    let mut opts = mikmod::Options::default();
    if let Some(rate) = matches.opt_str("r") {
        opts.rate = rate.parse()?;
    }
    if matches.opt_present("m") {
        opts.channels = OutputChannels::Mono;
    }
    if let Some(interp) = matches.opt_str("i") {
        opts.interpolation = interp.parse::<Interpolator>()?;
    }
    if let Some(lp) = matches.opt_str("l") {
        opts.loop_behavior = lp.parse::<LoopBehavior>()?;
    }
    if let Some(vol) = matches.opt_str("V") {
        opts.volume = vol.parse()?;
    }
    opts.check()?;
    Ok(opts)
}

fn show_info(player: &Player) {
    let song = player.song();
    let duration = player.scan_data().millis();
    println!("Format     : {} ({})", song.format, song.tracker);
    println!("Title      : {}", song.title);
    println!("MD5        : {}", song.md5());
    println!("Channels   : {}", song.channels);
    println!("Length     : {} positions, {} patterns", song.len(), song.patterns.len());
    println!("Instruments: {}", song.instruments.len());
    println!("Samples    : {}", song.samples.len());
    println!("Duration   : {}min{:02}s", duration / 60000, (duration / 1000) % 60);

    if !song.message.is_empty() {
        println!();
        for line in song.message.lines() {
            println!("> {}", line);
        }
    }
}

fn run(matches: &Matches) -> Result<(), Box<dyn Error>> {
    let name = &matches.free[0];
    let opts = engine_options(matches)?;
    let max_time = match matches.opt_str("t") {
        Some(t) => Some(t.parse::<u64>()?),
        None    => None,
    };

    let b = fs::read(name)?;
    let song = mikmod::load_song(&b)?;
    let mut player = Player::new(song, opts.clone())?;
    show_info(&player);

    if matches.opt_present("s") {
        return Ok(());
    }

    let target = matches.opt_str("o");
    let drv_name = match matches.opt_str("d") {
        Some(d) => d,
        None    => default_driver(target.is_some()).to_owned(),
    };
    let drv = driver::find(&drv_name, target.as_deref())?;
    let mut output = drv.open(opts.rate, opts.channels.count(), BUFFER_FRAMES)?;

    let len = player.song().len();
    let limit = max_time.map(|t| t * opts.rate as u64);
    player.play()?;
    while player.state() == PlayState::Playing {
        if let Some(l) = limit {
            if player.frames_played() >= l {
                break;
            }
        }
        player.render_to(&mut *output, BUFFER_FRAMES)?;

        let info = player.info();
        eprint!("\rPos {:3}/{:3}  Row {:3}  Time {}:{:02}  ",
            info.pos, len, info.row, info.time / 60000, (info.time / 1000) % 60);
        io::stderr().flush()?;
    }
    eprintln!();

    output.close()?;
    Ok(())
}

fn default_driver(has_file: bool) -> &'static str {
    if has_file {
        "wav"
    } else if cfg!(feature = "cpal") {
        "cpal"
    } else {
        "null"
    }
}
