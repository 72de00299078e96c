mod command;
mod functions;

use std::{
    env,
    fs,
    path::{
        Path,
        PathBuf,
    },
    process::ExitCode,
    sync::Arc,
    time::Instant,
};

use anyhow::Context as _;
use minvideo::{
    CliError,
    Config,
    Player,
    Result,
    TerminalDisplay,
    images,
    reader,
};

use crate::{
    command::Command,
    functions::{
        format_duration,
        get_path_or_curr_dir,
        optional_arg,
        required_arg,
    },
};

fn main() -> ExitCode
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run()
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) =>
        {
            eprintln!("{}", e);
            ExitCode::FAILURE
        },
    }
}

fn run() -> Result<()>
{
    let mut args = env::args().skip(1);

    let command_str = args.next().ok_or(CliError::NoCommand)?;

    let command = Command::from_name(&command_str).ok_or(CliError::UnknownCommand(command_str))?;

    execute(command, args)
}

fn execute(
    command: Command,
    mut args: impl Iterator<Item = String>,
) -> Result<()>
{
    let name = command.name();
    match command
    {
        Command::Help =>
        {
            print_help();
            Ok(())
        },
        Command::Init => execute_init(args.next().map(PathBuf::from)),
        Command::Parse => execute_parse(&PathBuf::from(required_arg(args.next(), name, "path")?)),
        Command::Convert =>
        {
            let input = PathBuf::from(required_arg(args.next(), name, "input file")?);
            let output = PathBuf::from(required_arg(args.next(), name, "output file")?);
            let width = optional_arg(args.next(), "width")?;
            let height = optional_arg(args.next(), "height")?;
            execute_convert(&input, &output, width, height)
        },
        Command::Pack =>
        {
            let frames_dir = PathBuf::from(required_arg(args.next(), name, "frames directory")?);
            let output = PathBuf::from(required_arg(args.next(), name, "output file")?);
            execute_pack(&frames_dir, &output)
        },
        Command::Export =>
        {
            let path = PathBuf::from(required_arg(args.next(), name, "path")?);
            let frame = required_arg(args.next(), name, "frame number")?;
            let frame = optional_arg::<usize>(Some(frame), "frame number")?.unwrap_or_default();
            execute_export(&path, frame, args.next().map(PathBuf::from))
        },
        Command::Play =>
        {
            let path = PathBuf::from(required_arg(args.next(), name, "path")?);
            let fps = optional_arg(args.next(), "fps")?;
            let frame_limit = optional_arg(args.next(), "frame limit")?;
            execute_play(&path, fps, frame_limit)
        },
    }
}

fn print_help()
{
    println!("MinVideo command line tool");
    println!();
    println!("Available options:");

    let commands = Command::all();
    let width = commands.iter().map(|c| c.name().len() + c.usage().len()).max().unwrap_or(0);
    for command in commands
    {
        let padding = width - command.name().len() - command.usage().len();
        println!(
            "  {} {}{}: {}",
            command.name(),
            command.usage(),
            " ".repeat(padding),
            command.description()
        );
    }
    println!();
    println!(
        "Settings are read from '{}' in the current directory.",
        minvideo::config::CONFIG_FILE_NAME
    );
    println!("Set RUST_LOG=info or RUST_LOG=debug for more output.");
}

fn load_config() -> Result<Config>
{
    Config::load_or_default(&get_path_or_curr_dir(None)?)
}

fn read_video(path: &Path) -> Result<Vec<u8>>
{
    let data = fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(data)
}

fn execute_init(path: Option<PathBuf>) -> Result<()>
{
    let dir = get_path_or_curr_dir(path)?;
    let config_file = Config::write_default(&dir)?;
    println!("Created config at: {}", config_file.display());
    Ok(())
}

fn execute_parse(path: &Path) -> Result<()>
{
    let data = read_video(path)?;
    let info = reader::probe(&data)?;
    let fps = load_config()?.fps;

    println!("Size: {}x{}", info.width, info.height);
    println!("Frames: {}", info.frame_count);
    println!("Frame size: {} bytes", info.frame_byte_size);
    println!(
        "Duration at {} fps: {}",
        fps,
        format_duration((info.frame_count as f64 / fps * 1000.0) as u128)
    );
    Ok(())
}

#[cfg(feature = "ffmpeg")]
fn execute_convert(
    input: &Path,
    output: &Path,
    width: Option<i32>,
    height: Option<i32>,
) -> Result<()>
{
    let config = load_config()?;
    let width = width.unwrap_or(config.convert_width);
    let height = height.unwrap_or(config.convert_height);

    println!("Converting standard video: {}", input.display());
    println!("To MinVideo: {}", output.display());

    let start = Instant::now();
    let video = minvideo::decoder::convert_video(input, width, height)?;
    video.write_to(output)?;

    println!(
        "Done: {} frames of {}x{} in {}",
        video.len(),
        video.width(),
        video.height(),
        format_duration(start.elapsed().as_millis())
    );
    Ok(())
}

#[cfg(not(feature = "ffmpeg"))]
fn execute_convert(
    _input: &Path,
    _output: &Path,
    _width: Option<i32>,
    _height: Option<i32>,
) -> Result<()>
{
    Err(CliError::FFmpegDisabled.into())
}

fn execute_pack(
    frames_dir: &Path,
    output: &Path,
) -> Result<()>
{
    let start = Instant::now();
    let paths = images::numbered_frames(frames_dir)?;
    println!("Packing {} frames from: {}", paths.len(), frames_dir.display());

    let video = images::pack_images(&paths, None)?;
    video.write_to(output)?;

    println!(
        "Done: {} frames of {}x{} in {}",
        video.len(),
        video.width(),
        video.height(),
        format_duration(start.elapsed().as_millis())
    );
    Ok(())
}

fn execute_export(
    path: &Path,
    frame: usize,
    png_file: Option<PathBuf>,
) -> Result<()>
{
    let data = read_video(path)?;
    let frame_count = reader::frame_count(&data)?;
    if frame == 0 || frame > frame_count
    {
        return Err(CliError::InvalidExportFrame(frame, frame_count).into());
    }

    let png_file = match png_file
    {
        Some(png_file) => png_file,
        None =>
        {
            let output_dir = load_config()?.output_dir;
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create '{}'", output_dir.display()))?;
            output_dir.join(format!("frame_{}.png", frame))
        },
    };

    reader::frame_at(&data, frame - 1)?.save_png(&png_file)?;
    println!("Saved frame {} to {}", frame, png_file.display());
    Ok(())
}

fn execute_play(
    path: &Path,
    fps: Option<f64>,
    frame_limit: Option<u64>,
) -> Result<()>
{
    let config = load_config()?;
    let mut playback = config.playback();
    if let Some(fps) = fps
    {
        playback.fps = fps;
    }

    let data: Arc<[u8]> = read_video(path)?.into();
    let mut display = TerminalDisplay::stdout();
    if let Some(limit) = frame_limit.or(config.frame_limit)
    {
        display = display.with_frame_limit(limit);
    }

    let mut player = Player::new();
    player.start(data, playback, display)?;
    let stats = player.wait()?;
    log::info!(
        "Presented {} of {} decoded frames, {} empty ticks, deepest queue {}",
        stats.frames_presented,
        stats.frames_decoded,
        stats.starved_ticks,
        stats.max_queue_depth
    );
    Ok(())
}
