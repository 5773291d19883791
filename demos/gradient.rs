//! Render a gradient fill into a 16-bit PPM image
use pixelkit::{
    Geometry, GradientFill, PixelBuffer, PixelGrid, QUANTUM_RANGE, Scalar, Session, Structured,
};
use std::{
    env,
    fs::File,
    io::{BufWriter, Write},
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    output_file: String,
    width: usize,
    height: usize,
    fill: GradientFill,
    dump: bool,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let session = Session::default();
        let mut width = 256;
        let mut height = 256;
        let mut line = [0.0, 0.0, 256.0, 128.0];
        let mut start = session.pixel("black")?;
        let mut stop = session.pixel("white")?;
        let mut dump = false;
        let mut output_file = None;

        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "gradient".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-s" => {
                    let size: Geometry = args.next().ok_or("-s requires argument")?.parse()?;
                    width = size.width.ok_or("-s requires width")? as usize;
                    height = size.height.or(size.width).unwrap_or(0.0) as usize;
                }
                "-l" => {
                    let text = args.next().ok_or("-l requires x1,y1,x2,y2 argument")?;
                    let values = text
                        .split(',')
                        .map(|value| value.trim().parse::<Scalar>())
                        .collect::<Result<Vec<_>, _>>()?;
                    line = values
                        .try_into()
                        .map_err(|_| "-l requires exactly four values")?;
                }
                "-c" => {
                    start = session.pixel(&args.next().ok_or("-c requires color argument")?)?;
                }
                "-C" => {
                    stop = session.pixel(&args.next().ok_or("-C requires color argument")?)?;
                }
                "-d" => dump = true,
                _ if output_file.is_none() => output_file = Some(arg),
                _ => return Err("unexpected positional argument".into()),
            }
        }
        let Some(output_file) = output_file else {
            eprintln!("Render gradient fill into a 16-bit PPM image");
            eprintln!("\nUSAGE:");
            eprintln!(
                "    {} [-s <WxH>] [-l <x1,y1,x2,y2>] [-c <color>] [-C <color>] [-d] <out.ppm>",
                cmd
            );
            eprintln!("\nARGS:");
            eprintln!("    -s <WxH>             size of the output image (default: 256x256)");
            eprintln!("    -l <x1,y1,x2,y2>     gradient line anchors");
            eprintln!("    -c <color>           start color (name or #hex)");
            eprintln!("    -C <color>           stop color (name or #hex)");
            eprintln!("    -d                   print structured fill record to stderr");
            eprintln!("    <out.ppm>            output file ('-' means stdout)");
            std::process::exit(1);
        };
        let [x1, y1, x2, y2] = line;
        Ok(Args {
            output_file,
            width,
            height,
            fill: GradientFill::new(x1, y1, x2, y2, start, stop),
            dump,
        })
    }
}

/// Write buffer as binary PPM with 16-bit channels (opacity is dropped)
fn ppm_write(buffer: &PixelBuffer, mut out: impl Write) -> Result<(), Error> {
    write!(out, "P6 {} {} {} ", buffer.width(), buffer.height(), QUANTUM_RANGE)?;
    for pixel in buffer.data() {
        for channel in [pixel.red(), pixel.green(), pixel.blue()] {
            out.write_all(&channel.to_be_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    if args.dump {
        eprintln!("{}", args.fill);
        eprintln!("{:?}", args.fill.encode());
    }

    let mut session = Session::default();
    session.set_monitor(|op, done, total| {
        if done + 1 == total {
            tracing::info!(op, total, "[monitor] done");
        }
    });
    let mut buffer = PixelBuffer::new(args.width, args.height);
    tracing::info!(
        kind = ?args.fill.kind(args.width, args.height),
        width = args.width,
        height = args.height,
        "[fill]"
    );
    session.fill(&args.fill, &mut buffer)?;

    let _save = tracing::debug_span!("[save]", file = %args.output_file).entered();
    if args.output_file != "-" {
        ppm_write(&buffer, BufWriter::new(File::create(&args.output_file)?))?;
    } else {
        ppm_write(&buffer, BufWriter::new(std::io::stdout().lock()))?;
    }
    Ok(())
}
