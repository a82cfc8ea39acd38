#![no_std]
#![no_main]

mod light_sensor;
mod serial;
mod wall_clock;

use panic_halt as _;

#[rtic::app(device = stm32f4xx_hal::pac, peripherals = true)]
mod app {
    use fan_firmware::{protocol::CommandReader, Config, Controller, GpioRelay, PollClock};
    use rtt_target::{rprintln, rtt_init_print};
    use shared_bus_rtic::SharedBus;
    use stm32f4xx_hal::{
        gpio::{
            gpioa::PA8,
            gpiob::{PB6, PB7},
            AlternateOD, Output, PushPull,
        },
        i2c::I2c,
        otg_fs::{UsbBus, UsbBusType, USB},
        pac,
        prelude::*,
        timer::{CounterHz, Event},
    };
    use usb_device::{bus::UsbBusAllocator, prelude::*};
    use usbd_serial::SerialPort;

    use crate::{
        light_sensor::LightSensor,
        serial::{self, SerialPortType},
        wall_clock::WallClock,
    };

    /// Controller configuration, validated at boot
    const CONFIG: Config = Config::DEFAULT;

    /// Light sensor polling rate
    const POLL_RATE_HZ: u32 = 10;

    /// The relay board switches on when its input is pulled low
    const RELAY_ACTIVE_LOW: bool = true;

    type I2cBus = I2c<pac::I2C1, (PB6<AlternateOD<4>>, PB7<AlternateOD<4>>)>;
    type FanController = Controller<GpioRelay<PA8<Output<PushPull>>>>;

    #[shared]
    struct Shared {
        controller: FanController,
        usb_dev: UsbDevice<'static, UsbBusType>,
        usb_serial: SerialPortType,
    }

    #[local]
    struct Local {
        poll_timer: CounterHz<pac::TIM2>,
        light_sensor: LightSensor<SharedBus<I2cBus>>,
        clock: WallClock<SharedBus<I2cBus>>,
        poll_clock: PollClock,
    }

    #[init(local = [
        ep_memory: [u32; 1024] = [0; 1024],
        usb_bus: Option<UsbBusAllocator<UsbBusType>> = None,
    ])]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        rtt_init_print!();

        rprintln!("Initializing");

        if let Err(e) = CONFIG.validate() {
            rprintln!("Invalid configuration: {}", e.as_str());
            panic!();
        }

        // Clock setup, USB needs the 48 MHz PLL output
        let rcc = ctx.device.RCC.constrain();
        let clocks = rcc
            .cfgr
            .use_hse(25.MHz())
            .sysclk(48.MHz())
            .require_pll48clk()
            .freeze();

        rprintln!("Clock setup done");

        // GPIO setup
        let gpioa = ctx.device.GPIOA.split();
        let gpiob = ctx.device.GPIOB.split();

        // I2C setup. SCL is PB6 and SDA is PB7 (both with AF04).
        // The light sensor and the RTC share the bus.
        let scl = gpiob.pb6.into_alternate_open_drain();
        let sda = gpiob.pb7.into_alternate_open_drain();
        let i2c = I2c::new(ctx.device.I2C1, (scl, sda), 400.kHz(), &clocks);
        let bus = shared_bus_rtic::new!(i2c, I2cBus);

        let relay_pin = gpioa.pa8.into_push_pull_output();

        rprintln!("I2C and GPIO setup done");

        let mut clock = WallClock::new(bus.acquire());
        let clock_reading = clock.now();
        let now = clock_reading.unwrap_or(0);

        let light_sensor = LightSensor::new(bus.acquire(), &mut |e: fan_firmware::Error| {
            rprintln!("{}", e.as_str());
        });
        rprintln!("Light sensor setup done");

        let mut controller =
            Controller::new(CONFIG, GpioRelay::new(relay_pin, RELAY_ACTIVE_LOW), now);
        if let Err(e) = clock_reading {
            rprintln!("{}", e.as_str());
            controller.log_error(e);
        }
        let poll_clock = PollClock::new(now, POLL_RATE_HZ);

        // USB serial
        let usb = USB {
            usb_global: ctx.device.OTG_FS_GLOBAL,
            usb_device: ctx.device.OTG_FS_DEVICE,
            usb_pwrclk: ctx.device.OTG_FS_PWRCLK,
            pin_dm: gpioa.pa11.into_alternate(),
            pin_dp: gpioa.pa12.into_alternate(),
            hclk: clocks.hclk(),
        };
        let usb_bus: &'static UsbBusAllocator<UsbBusType> =
            ctx.local.usb_bus.insert(UsbBus::new(usb, ctx.local.ep_memory));
        let usb_serial = SerialPort::new_with_store(
            usb_bus,
            [0u8; serial::SERIAL_READ_BUFFER_BYTES],
            [0u8; serial::SERIAL_WRITE_BUFFER_BYTES],
        );
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("Fan Controller")
            .product("Light Switch Fan")
            .serial_number("FAN1")
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();

        rprintln!("USB setup done");

        // Sensor polling
        let mut poll_timer = ctx.device.TIM2.counter_hz(&clocks);
        if poll_timer.start(POLL_RATE_HZ.Hz()).is_err() {
            rprintln!("Could not start poll timer");
        }
        poll_timer.listen(Event::Update);

        rprintln!("Done initializing");

        (
            Shared {
                controller,
                usb_dev,
                usb_serial,
            },
            Local {
                poll_timer,
                light_sensor,
                clock,
                poll_clock,
            },
            init::Monotonics(),
        )
    }

    #[task(
        binds = TIM2,
        shared = [controller, usb_serial],
        local = [poll_timer, light_sensor, clock, poll_clock, last_report: u64 = 0],
    )]
    fn poll(ctx: poll::Context) {
        ctx.local.poll_timer.clear_interrupt(Event::Update);

        let clock_reading = ctx.local.clock.now();
        let poll_clock = ctx.local.poll_clock;
        let light_sensor = ctx.local.light_sensor;
        let last_report = ctx.local.last_report;

        (ctx.shared.controller, ctx.shared.usb_serial).lock(|controller, usb_serial| {
            // Without the RTC, keep counting on the poll rate
            let now = match clock_reading {
                Ok(now) => poll_clock.read(now),
                Err(e) => {
                    let (now, report) = poll_clock.missed();
                    if report {
                        rprintln!("{}", e.as_str());
                        controller.log_error(e);
                    }
                    now
                }
            };
            let sample = match light_sensor.sample(controller.config()) {
                Ok(sample) => sample,
                Err(e) => {
                    controller.log_error(e);
                    fan_firmware::IntensitySample::Unreadable
                }
            };
            if let Some(toggle) = controller.poll(sample, now) {
                rprintln!("Toggle: {}", toggle.name());
            }

            // Status once per second
            if now != *last_report {
                *last_report = now;
                if let Err(e) = serial::report(usb_serial, controller, now) {
                    rprintln!("{}", e.as_str());
                }
            }
        });
    }

    #[task(
        binds = OTG_FS,
        shared = [controller, usb_dev, usb_serial],
        local = [commands: CommandReader = CommandReader::new()],
    )]
    fn usb(ctx: usb::Context) {
        let commands = ctx.local.commands;
        (ctx.shared.controller, ctx.shared.usb_dev, ctx.shared.usb_serial).lock(
            |controller, usb_dev, usb_serial| {
                if !usb_dev.poll(&mut [usb_serial]) {
                    return;
                }
                if let Some(command) = serial::read_command(usb_serial, commands) {
                    rprintln!("Override: {}", command.name());
                    controller.apply_override(command);
                }
            },
        );
    }
}
