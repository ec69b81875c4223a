use soup_core::{
    assemble, disassemble, load_creature, load_creature_from_file, search_backward,
    search_forward, Cpu, Dispatch, Fault, Simulation, Soup, StepOutcome, Template, SOUP_SIZE,
};
use std::path::Path;

fn ancestor_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/creatures/ancestor.asm"))
}

fn loaded(lines: &[&str], base: i64) -> Simulation {
    let mut sim = Simulation::new();
    let (_, cpu) = load_creature(lines.iter().copied(), &mut sim.soup, base);
    sim.cpu = cpu;
    sim
}

#[test]
fn push_pop_program_moves_value_between_registers() {
    let lines = ["inc_a", "inc_a", "push_ax", "pop_bx"];
    assert_eq!(assemble(lines), vec![0x08, 0x08, 0x0c, 0x11]);

    let mut sim = loaded(&lines, 0);
    let summary = sim.run(4, None);
    assert_eq!(summary.steps, 4);
    assert_eq!(sim.cpu.ax, 2);
    assert_eq!(sim.cpu.bx, 2);
    assert_eq!(sim.cpu.sp, 0);
    assert!(!sim.cpu.fl);
    assert_eq!(sim.cpu.ip, 4);
}

#[test]
fn if_cz_skips_the_next_instruction() {
    // cx starts at zero so inc_a is skipped
    let mut sim = loaded(&["if_cz", "inc_a", "inc_b"], 0);
    sim.run(2, None);
    assert_eq!(sim.cpu.ax, 0);
    assert_eq!(sim.cpu.bx, 1);
    assert_eq!(sim.cpu.ip, 3);
}

#[test]
fn tenth_push_overflows_and_later_pops_still_work() {
    let mut lines = vec!["inc_a"];
    lines.extend(std::iter::repeat("push_ax").take(10));
    lines.push("pop_cx");
    let mut sim = loaded(&lines, 0);

    sim.run(10, None);
    assert_eq!(sim.cpu.sp, 9);
    assert!(!sim.cpu.fl);

    assert_eq!(sim.step(), StepOutcome::Faulted(0x0c, Fault::StackOverflow));
    assert_eq!(sim.cpu.sp, 9);
    assert!(sim.cpu.fl);

    assert_eq!(sim.step(), StepOutcome::Executed(0x12));
    assert_eq!(sim.cpu.cx, 1);
    assert_eq!(sim.cpu.sp, 8);
    assert!(sim.cpu.fl, "flag stays raised");
}

#[test]
fn search_finds_complement_in_both_directions() {
    let mut soup = Soup::new();
    soup.write_slice(0, &[0x04; 64]);
    soup.write_slice(10, &[0x01, 0x00, 0x04]);
    soup.write_slice(40, &[0x01, 0x00, 0x04]);

    let template = Template::new(0b01, 2);
    assert_eq!(search_forward(&soup, 20, template), Some(40));
    assert_eq!(search_backward(&soup, 20, template), Some(10));
}

#[test]
fn ancestor_listing_loads_and_copies_its_own_size() {
    let mut sim = Simulation::new();
    let (size, cpu) =
        load_creature_from_file(ancestor_path(), &mut sim.soup, 0).expect("load ancestor");
    assert_eq!(size, 80);
    assert_eq!(cpu, Cpu::at(0));
    sim.cpu = cpu;

    let listing = disassemble(&sim.soup, 0, size);
    assert_eq!(listing[0], "00000 01 nop_1");
    assert_eq!(listing[9], "00009 1c adrb");
    assert_eq!(listing[79], "00079 05 if_cz");

    // Prologue: template size into dx, then measure self with adrb/adrf.
    let summary = sim.run(23, None);
    assert_eq!(summary.faults.total(), 0);
    assert_eq!(sim.cpu.dx, 4);
    assert_eq!(sim.cpu.ax, 76);
    assert_eq!(sim.cpu.bx, -4);
    assert_eq!(sim.cpu.cx, size as i64);
    assert_eq!(sim.cpu.ip, 23);
    assert!(!sim.cpu.fl);
}

#[test]
fn ancestor_loaded_across_the_boundary_wraps() {
    let base = SOUP_SIZE as i64 - 3;
    let mut sim = Simulation::new();
    let (size, cpu) =
        load_creature_from_file(ancestor_path(), &mut sim.soup, base).expect("load ancestor");
    assert_eq!(cpu.ip, base);
    assert_eq!(sim.soup.read_slice(base, 4), vec![0x01, 0x01, 0x01, 0x01]);
    assert_eq!(sim.soup.read(size as i64 - 4), 0x05);
}

#[test]
fn custom_handlers_extend_the_instruction_set() {
    fn triple_cx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
        cpu.cx *= 3;
        Ok(())
    }

    let mut sim = Simulation::new();
    sim.soup.write_slice(0, &[0x0b, 0x40, 0x40]);
    assert!(sim.dispatch_mut().register(0x40, triple_cx).is_none());

    let summary = sim.run(3, None);
    assert_eq!(summary.ignored, 0);
    assert_eq!(sim.cpu.cx, 9);
    assert!(Dispatch::empty().lookup(0x40).is_none());
}
