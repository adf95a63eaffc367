use super::*;
use crate::ddg::alias::FalseAliasAnalyzer;
use crate::ddg::{DependenceEdge, DependenceKind, DependenceType};
use crate::error::ErrorKind;
use crate::machine::{OperationSignature, MINIMAL};
use crate::program::{
    ControlFlowEdge, ControlFlowEdgeKind, ControlFlowGraph, Guard, Instruction, Move,
    MoveAnnotation, PortRead, PortWrite, Register,
};

fn reg(index: usize) -> Register {
    Register::new("RF", index)
}

fn bool_reg() -> Register {
    Register::new("BOOL", 0)
}

fn write_imm(value: i64, index: usize) -> Move {
    Move::new(Source::Immediate(value), Destination::Register(reg(index)))
}

fn copy_reg(from: usize, to: usize) -> Move {
    Move::new(Source::Register(reg(from)), Destination::Register(reg(to)))
}

/// One move per instruction.
fn block_of(index: usize, moves: Vec<Move>) -> BasicBlock {
    let instructions = moves
        .into_iter()
        .enumerate()
        .map(|(i, mv)| Instruction::new(i, vec![mv]))
        .collect();
    BasicBlock::new(index, instructions)
}

fn procedure_of(blocks: Vec<BasicBlock>, edges: Vec<ControlFlowEdge>) -> Procedure {
    let mut cfg = ControlFlowGraph::new();
    for block in blocks {
        cfg.graph_mut().insert_vertex(block).unwrap();
    }
    for edge in edges {
        cfg.graph_mut().insert_edge(edge).unwrap();
    }
    cfg.set_entry(0);
    Procedure::new("test", cfg)
}

fn single_block_procedure(moves: Vec<Move>) -> Procedure {
    procedure_of(vec![block_of(0, moves)], vec![])
}

fn build(procedure: &Procedure) -> DataDependenceGraph {
    DataDependenceGraphBuilder::new(&MINIMAL, BuilderOptions::default())
        .build(procedure)
        .unwrap()
}

fn node_at(ddg: &DataDependenceGraph, block: usize, instruction: usize) -> NodeId {
    ddg.node_of_move(MoveRef::new(block, instruction, 0)).unwrap()
}

fn count_edges(
    ddg: &DataDependenceGraph,
    head: NodeId,
    tail: NodeId,
    kind: DependenceKind,
    dependence: DependenceType,
) -> usize {
    ddg.edges_between(head, tail)
        .into_iter()
        .filter(|edge| edge.kind() == kind && edge.dependence() == dependence)
        .count()
}

#[test]
fn unconditional_write_then_read_is_one_raw_edge() {
    let procedure = single_block_procedure(vec![write_imm(1, 7), copy_reg(7, 8)]);
    let ddg = build(&procedure);

    let write = node_at(&ddg, 0, 0);
    let read = node_at(&ddg, 0, 1);
    assert_eq!(
        count_edges(&ddg, write, read, DependenceKind::Register, DependenceType::Raw),
        1
    );
    let edge = ddg.edges_between(write, read)[0];
    assert_eq!(edge.data(), Some("RF.7"));
    assert!(!edge.is_back_edge());
    assert_eq!(ddg.edge_count(), 1);
}

#[test]
fn exclusive_guarded_writes_stay_parallel() {
    let guard_write = Move::new(Source::Immediate(1), Destination::Register(bool_reg()));
    let w1 = Move::guarded(
        Source::Immediate(1),
        Destination::Register(reg(7)),
        Guard::register(bool_reg(), false),
    );
    let w2 = Move::guarded(
        Source::Immediate(2),
        Destination::Register(reg(7)),
        Guard::register(bool_reg(), true),
    );
    let read = copy_reg(7, 8);
    let procedure = single_block_procedure(vec![guard_write, w1, w2, read]);
    let ddg = build(&procedure);

    let gw = node_at(&ddg, 0, 0);
    let w1 = node_at(&ddg, 0, 1);
    let w2 = node_at(&ddg, 0, 2);
    let read = node_at(&ddg, 0, 3);

    // both guarded writes feed the read
    assert_eq!(count_edges(&ddg, w1, read, DependenceKind::Register, DependenceType::Raw), 1);
    assert_eq!(count_edges(&ddg, w2, read, DependenceKind::Register, DependenceType::Raw), 1);
    // no ordering between the exclusive writes themselves
    assert!(ddg.edges_between(w1, w2).is_empty());
    assert!(ddg.edges_between(w2, w1).is_empty());
    // each guarded move reads the guard register
    assert!(ddg
        .edges_between(gw, w1)
        .iter()
        .any(|edge| edge.guard_use()));
    assert!(ddg
        .edges_between(gw, w2)
        .iter()
        .any(|edge| edge.guard_use()));
    assert!(ddg.exclusive_guards(w1, w2));
    assert!(!ddg.same_guards(w1, w2));
}

#[test]
fn guarded_kill_pair_stops_earlier_definitions() {
    let b0 = block_of(
        0,
        vec![
            write_imm(1, 7),
            Move::new(Source::Immediate(1), Destination::Register(bool_reg())),
        ],
    );
    let b1 = block_of(
        1,
        vec![
            Move::guarded(
                Source::Immediate(2),
                Destination::Register(reg(7)),
                Guard::register(bool_reg(), false),
            ),
            Move::guarded(
                Source::Immediate(3),
                Destination::Register(reg(7)),
                Guard::register(bool_reg(), true),
            ),
            copy_reg(7, 8),
        ],
    );
    let procedure = procedure_of(
        vec![b0, b1],
        vec![ControlFlowEdge::new(0, 1, ControlFlowEdgeKind::Fallthrough)],
    );
    let ddg = build(&procedure);

    let w0 = node_at(&ddg, 0, 0);
    let w1 = node_at(&ddg, 1, 0);
    let w2 = node_at(&ddg, 1, 1);
    let read = node_at(&ddg, 1, 2);

    // the pair jointly kills, so the older definition never reaches
    // the read behind it
    assert!(ddg.edges_between(w0, read).is_empty());
    assert_eq!(count_edges(&ddg, w1, read, DependenceKind::Register, DependenceType::Raw), 1);
    assert_eq!(count_edges(&ddg, w2, read, DependenceKind::Register, DependenceType::Raw), 1);
    // both halves still order against the incoming definition
    assert_eq!(count_edges(&ddg, w0, w1, DependenceKind::Register, DependenceType::Waw), 1);
    assert_eq!(count_edges(&ddg, w0, w2, DependenceKind::Register, DependenceType::Waw), 1);
}

#[test]
fn operation_assembly_seals_and_connects() {
    let procedure = single_block_procedure(vec![
        Move::new(
            Source::Immediate(1),
            Destination::FuPort(PortWrite::new("ADD", 1)),
        ),
        Move::new(
            Source::Immediate(2),
            Destination::FuPort(PortWrite::trigger("ADD", 2)),
        ),
        Move::new(
            Source::FuPort(PortRead::new("ADD", 1)),
            Destination::Register(reg(7)),
        ),
    ]);
    let ddg = build(&procedure);

    let operand = node_at(&ddg, 0, 0);
    let trigger = node_at(&ddg, 0, 1);
    let result = node_at(&ddg, 0, 2);

    assert_eq!(ddg.operation_count(), 1);
    let operation = ddg.operation(0);
    assert!(operation.is_complete());
    assert_eq!(operation.input_nodes().len(), 2);
    assert_eq!(operation.output_nodes().len(), 1);
    assert_eq!(operation.trigger(), Some(trigger));

    assert_eq!(
        count_edges(&ddg, operand, result, DependenceKind::Operation, DependenceType::Unknown),
        1
    );
    assert_eq!(
        count_edges(&ddg, trigger, result, DependenceKind::Operation, DependenceType::Unknown),
        1
    );
    assert_eq!(ddg.node(operand).destination_operation(), Some(0));
    assert_eq!(ddg.node(result).source_operation(), Some(0));
}

#[test]
fn self_loop_carries_write_to_read() {
    let b0 = block_of(0, vec![copy_reg(7, 8), write_imm(1, 7)]);
    let procedure = procedure_of(
        vec![b0],
        vec![ControlFlowEdge::back(0, 0, ControlFlowEdgeKind::Jump)],
    );
    let ddg = build(&procedure);

    let read = node_at(&ddg, 0, 0);
    let write = node_at(&ddg, 0, 1);

    let loop_raw = ddg
        .edges_between(write, read)
        .into_iter()
        .filter(|edge| edge.dependence() == DependenceType::Raw)
        .collect::<Vec<_>>();
    assert_eq!(loop_raw.len(), 1);
    assert!(loop_raw[0].is_back_edge());
    assert_eq!(loop_raw[0].data(), Some("RF.7"));

    // the in-block antidependence is not loop carried, the carried
    // one is
    assert!(ddg
        .edges_between(read, write)
        .iter()
        .any(|edge| edge.dependence() == DependenceType::War && !edge.is_back_edge()));
    assert!(ddg
        .edges_between(read, write)
        .iter()
        .any(|edge| edge.dependence() == DependenceType::War && edge.is_back_edge()));
}

fn store(address: i64, value: i64, annotation: Option<MoveAnnotation>) -> Vec<Move> {
    let mut trigger = Move::new(
        Source::Immediate(value),
        Destination::FuPort(PortWrite::trigger("STW", 2)),
    );
    if let Some(annotation) = annotation {
        trigger.annotate(annotation);
    }
    vec![
        Move::new(
            Source::Immediate(address),
            Destination::FuPort(PortWrite::new("STW", 1)),
        ),
        trigger,
    ]
}

fn load_reg_address(address_register: usize, result_register: usize) -> Vec<Move> {
    vec![
        Move::new(
            Source::Register(reg(address_register)),
            Destination::FuPort(PortWrite::trigger("LDW", 1)),
        ),
        Move::new(
            Source::FuPort(PortRead::new("LDW", 1)),
            Destination::Register(reg(result_register)),
        ),
    ]
}

fn store_reg_address(address_register: usize, value: i64) -> Vec<Move> {
    vec![
        Move::new(
            Source::Register(reg(address_register)),
            Destination::FuPort(PortWrite::new("STW", 1)),
        ),
        Move::new(
            Source::Immediate(value),
            Destination::FuPort(PortWrite::trigger("STW", 2)),
        ),
    ]
}

#[test]
fn distinct_categories_never_alias() {
    let mut moves = store(0x100, 5, Some(MoveAnnotation::SpillSlotAccess));
    moves.extend(store(0x100, 6, Some(MoveAnnotation::AddressSpace(1))));
    let procedure = single_block_procedure(moves);
    let ddg = build(&procedure);

    assert!(ddg
        .edges()
        .all(|edge| edge.kind() != DependenceKind::Memory));
}

#[test]
fn same_constant_address_is_a_certain_dependence() {
    let mut moves = store(0x100, 5, None);
    moves.extend(store(0x100, 6, None));
    moves.extend(store(0x100, 7, None));
    let procedure = single_block_procedure(moves);
    let ddg = build(&procedure);

    let first_trigger = node_at(&ddg, 0, 1);
    let second_trigger = node_at(&ddg, 0, 3);
    let third_trigger = node_at(&ddg, 0, 5);

    let waw = ddg
        .edges_between(first_trigger, second_trigger)
        .into_iter()
        .find(|edge| edge.kind() == DependenceKind::Memory)
        .unwrap();
    assert_eq!(waw.dependence(), DependenceType::Waw);
    assert!(waw.certain_alias());

    // a certain unconditional overwrite supersedes the first store;
    // the third orders only against the second
    assert!(ddg.edges_between(first_trigger, third_trigger).is_empty());
    assert_eq!(
        count_edges(&ddg, second_trigger, third_trigger, DependenceKind::Memory, DependenceType::Waw),
        1
    );
}

#[test]
fn disjoint_constant_addresses_do_not_alias() {
    let mut moves = store(0x100, 5, None);
    moves.extend(store(0x200, 6, None));
    let procedure = single_block_procedure(moves);
    let ddg = build(&procedure);

    assert!(ddg
        .edges()
        .all(|edge| edge.kind() != DependenceKind::Memory));
}

#[test]
fn unknown_addresses_are_conservatively_ordered() {
    let mut moves = store_reg_address(7, 5);
    moves.extend(load_reg_address(8, 9));
    let procedure = single_block_procedure(moves);
    let ddg = build(&procedure);

    let store_address = node_at(&ddg, 0, 0);
    let store_trigger = node_at(&ddg, 0, 1);
    let load_trigger = node_at(&ddg, 0, 2);

    // every input of the earlier operation holds the load back
    for head in [store_address, store_trigger].iter() {
        let raw = ddg
            .edges_between(*head, load_trigger)
            .into_iter()
            .find(|edge| edge.kind() == DependenceKind::Memory)
            .unwrap();
        assert_eq!(raw.dependence(), DependenceType::Raw);
        assert!(!raw.certain_alias());
    }
}

#[test]
fn false_alias_analyzer_suppresses_memory_edges() {
    let mut moves = store_reg_address(7, 5);
    moves.extend(load_reg_address(8, 9));
    let procedure = single_block_procedure(moves);

    let mut builder = DataDependenceGraphBuilder::new(&MINIMAL, BuilderOptions::default());
    builder.add_alias_analyzer(Box::new(FalseAliasAnalyzer::new()));
    let ddg = builder.build(&procedure).unwrap();

    assert!(ddg
        .edges()
        .all(|edge| edge.kind() != DependenceKind::Memory));
}

fn add_offset(base: usize, offset: i64, result: usize) -> Vec<Move> {
    vec![
        Move::new(
            Source::Register(reg(base)),
            Destination::FuPort(PortWrite::new("ADD", 1)),
        ),
        Move::new(
            Source::Immediate(offset),
            Destination::FuPort(PortWrite::trigger("ADD", 2)),
        ),
        Move::new(
            Source::FuPort(PortRead::new("ADD", 1)),
            Destination::Register(reg(result)),
        ),
    ]
}

#[test]
fn offset_analyzer_separates_fields_of_one_base() {
    let mut moves = vec![write_imm(16, 7)];
    moves.extend(add_offset(7, 4, 8));
    moves.extend(store_reg_address(8, 1));
    moves.extend(add_offset(7, 8, 9));
    moves.extend(store_reg_address(9, 2));
    let procedure = single_block_procedure(moves);

    let options = BuilderOptions {
        enable_offset_alias: true,
        ..BuilderOptions::default()
    };
    let ddg = DataDependenceGraphBuilder::new(&MINIMAL, options)
        .build(&procedure)
        .unwrap();

    let first_trigger = node_at(&ddg, 0, 5);
    let second_trigger = node_at(&ddg, 0, 10);
    assert!(ddg
        .edges_between(first_trigger, second_trigger)
        .iter()
        .all(|edge| edge.kind() != DependenceKind::Memory));
}

#[test]
fn fu_state_orders_related_operations() {
    let mut machine = MINIMAL.clone();
    let mut init = OperationSignature::new("INIT_RNG", 1, 0);
    init.set_side_effects(true);
    machine.add_operation(init);
    let mut sample = OperationSignature::new("RNG", 1, 1);
    sample.add_affected_by("INIT_RNG");
    machine.add_operation(sample);

    let procedure = single_block_procedure(vec![
        Move::new(
            Source::Immediate(1),
            Destination::FuPort(PortWrite::trigger("INIT_RNG", 1)),
        ),
        Move::new(
            Source::Immediate(0),
            Destination::FuPort(PortWrite::trigger("RNG", 1)),
        ),
        Move::new(
            Source::FuPort(PortRead::new("RNG", 1)),
            Destination::Register(reg(7)),
        ),
    ]);
    let ddg = DataDependenceGraphBuilder::new(&machine, BuilderOptions::default())
        .build(&procedure)
        .unwrap();

    let init_trigger = node_at(&ddg, 0, 0);
    let sample_trigger = node_at(&ddg, 0, 1);
    assert_eq!(
        count_edges(&ddg, init_trigger, sample_trigger, DependenceKind::FuState, DependenceType::Unknown),
        1
    );
}

#[test]
fn memory_raw_crosses_block_boundary() {
    let b0 = block_of(0, store_reg_address(7, 5));
    let b1 = block_of(1, load_reg_address(8, 9));
    let procedure = procedure_of(
        vec![b0, b1],
        vec![ControlFlowEdge::new(0, 1, ControlFlowEdgeKind::Fallthrough)],
    );
    let ddg = build(&procedure);

    let store_trigger = node_at(&ddg, 0, 1);
    let load_trigger = node_at(&ddg, 1, 0);
    assert_eq!(
        count_edges(&ddg, store_trigger, load_trigger, DependenceKind::Memory, DependenceType::Raw),
        1
    );
}

#[test]
fn calls_pin_convention_registers_and_memory() {
    let mut moves = vec![write_imm(0x1000, 1)];
    moves.extend(store_reg_address(7, 5));
    moves.push(Move::new(Source::Immediate(0x400), Destination::Call));
    moves.extend(load_reg_address(8, 9));
    moves.push(copy_reg(0, 10));
    let procedure = single_block_procedure(moves);
    let ddg = build(&procedure);

    let sp_write = node_at(&ddg, 0, 0);
    let store_trigger = node_at(&ddg, 0, 2);
    let call = node_at(&ddg, 0, 3);
    let load_trigger = node_at(&ddg, 0, 4);
    let rv_read = node_at(&ddg, 0, 6);

    // the call reads the stack pointer
    let sp_edge = ddg
        .edges_between(sp_write, call)
        .into_iter()
        .find(|edge| edge.data() == Some("RF.1"))
        .unwrap();
    assert_eq!(sp_edge.dependence(), DependenceType::Raw);
    assert!(sp_edge.tail_pseudo());

    // the caller reads the return value the call wrote
    let rv_edge = ddg
        .edges_between(call, rv_read)
        .into_iter()
        .find(|edge| edge.data() == Some("RF.0"))
        .unwrap();
    assert_eq!(rv_edge.dependence(), DependenceType::Raw);
    assert!(rv_edge.head_pseudo());

    // memory is ordered through the call, never around it
    assert_eq!(
        count_edges(&ddg, store_trigger, call, DependenceKind::Memory, DependenceType::Waw),
        1
    );
    assert_eq!(
        count_edges(&ddg, call, load_trigger, DependenceKind::Memory, DependenceType::Raw),
        1
    );
    assert!(ddg
        .edges_between(store_trigger, load_trigger)
        .iter()
        .all(|edge| edge.kind() != DependenceKind::Memory));
}

#[test]
fn diamond_merges_identical_dependencies() {
    let b0 = block_of(0, vec![write_imm(1, 7)]);
    let b1 = block_of(1, vec![]);
    let b2 = block_of(2, vec![]);
    let b3 = block_of(3, vec![copy_reg(7, 8)]);
    let edges = vec![
        ControlFlowEdge::new(0, 1, ControlFlowEdgeKind::Jump),
        ControlFlowEdge::new(0, 2, ControlFlowEdgeKind::Fallthrough),
        ControlFlowEdge::new(1, 3, ControlFlowEdgeKind::Jump),
        ControlFlowEdge::new(2, 3, ControlFlowEdgeKind::Fallthrough),
    ];
    let procedure = procedure_of(vec![b0, b1, b2, b3], edges);
    let ddg = build(&procedure);

    let write = node_at(&ddg, 0, 0);
    let read = node_at(&ddg, 3, 0);
    assert_eq!(
        count_edges(&ddg, write, read, DependenceKind::Register, DependenceType::Raw),
        1
    );
}

#[test]
fn rebuilding_yields_the_same_edges() {
    let b0 = block_of(0, vec![copy_reg(7, 8), write_imm(1, 7)]);
    let procedure = procedure_of(
        vec![b0],
        vec![ControlFlowEdge::back(0, 0, ControlFlowEdgeKind::Jump)],
    );

    let first = build(&procedure);
    let second = build(&procedure);

    let mut first_edges: Vec<DependenceEdge> = first.edges().cloned().collect();
    let mut second_edges: Vec<DependenceEdge> = second.edges().cloned().collect();
    first_edges.sort();
    second_edges.sort();
    assert_eq!(first_edges, second_edges);
}

#[test]
fn unreachable_blocks_are_still_processed() {
    let b0 = block_of(0, vec![write_imm(1, 7)]);
    let b1 = block_of(1, vec![write_imm(2, 8)]);
    let procedure = procedure_of(vec![b0, b1], vec![]);
    let ddg = build(&procedure);

    assert!(ddg.node_of_move(MoveRef::new(1, 0, 0)).is_ok());
}

#[test]
fn register_deaths_follow_the_last_reader() {
    let b0 = block_of(0, vec![write_imm(1, 7), write_imm(2, 9)]);
    let b1 = block_of(1, vec![copy_reg(7, 8)]);
    let b2 = block_of(2, vec![]);
    let b3 = block_of(3, vec![copy_reg(9, 8)]);
    let edges = vec![
        ControlFlowEdge::new(0, 1, ControlFlowEdgeKind::Jump),
        ControlFlowEdge::new(0, 2, ControlFlowEdgeKind::Fallthrough),
        ControlFlowEdge::new(1, 3, ControlFlowEdgeKind::Jump),
        ControlFlowEdge::new(2, 3, ControlFlowEdgeKind::Fallthrough),
    ];
    let procedure = procedure_of(vec![b0, b1, b2, b3], edges);

    let options = BuilderOptions {
        compute_register_deaths: true,
        ..BuilderOptions::default()
    };
    let ddg = DataDependenceGraphBuilder::new(&MINIMAL, options)
        .build(&procedure)
        .unwrap();

    let after_entry = ddg.registers_used_after(0).unwrap();
    assert!(after_entry.contains("RF.7"));
    assert!(after_entry.contains("RF.9"));

    // RF.7's only reader is block 1, so it is dead beyond it
    let after_left = ddg.registers_used_after(1).unwrap();
    assert!(after_left.contains("RF.9"));
    assert!(!after_left.contains("RF.7"));

    assert!(ddg.registers_used_after(3).unwrap().is_empty());
}

#[test]
fn single_block_mode_skips_the_entry_node() {
    let block = block_of(0, vec![write_imm(1, 7), copy_reg(7, 8)]);
    let ddg = DataDependenceGraphBuilder::new(&MINIMAL, BuilderOptions::default())
        .build_block(&block)
        .unwrap();

    assert_eq!(ddg.node_count(), 2);
    let write = node_at(&ddg, 0, 0);
    let read = node_at(&ddg, 0, 1);
    assert_eq!(
        count_edges(&ddg, write, read, DependenceKind::Register, DependenceType::Raw),
        1
    );
}

fn expect_illegal_program(procedure: &Procedure) {
    let error = DataDependenceGraphBuilder::new(&MINIMAL, BuilderOptions::default())
        .build(procedure)
        .unwrap_err();
    match error.kind() {
        ErrorKind::IllegalProgram(_) => {}
        other => panic!("expected IllegalProgram, got {:?}", other),
    }
}

#[test]
fn trigger_without_operand_is_rejected() {
    expect_illegal_program(&single_block_procedure(vec![Move::new(
        Source::Immediate(2),
        Destination::FuPort(PortWrite::trigger("ADD", 2)),
    )]));
}

#[test]
fn result_read_without_operands_is_rejected() {
    expect_illegal_program(&single_block_procedure(vec![Move::new(
        Source::FuPort(PortRead::new("ADD", 1)),
        Destination::Register(reg(7)),
    )]));
}

#[test]
fn incomplete_operation_at_block_end_is_rejected() {
    expect_illegal_program(&single_block_procedure(vec![Move::new(
        Source::Immediate(1),
        Destination::FuPort(PortWrite::new("ADD", 1)),
    )]));
}

#[test]
fn early_trigger_is_rejected() {
    let mut machine = MINIMAL.clone();
    machine.add_operation(OperationSignature::new("MAC", 3, 1));
    let procedure = single_block_procedure(vec![
        Move::new(
            Source::Immediate(1),
            Destination::FuPort(PortWrite::new("MAC", 1)),
        ),
        Move::new(
            Source::Immediate(2),
            Destination::FuPort(PortWrite::trigger("MAC", 3)),
        ),
    ]);
    let error = DataDependenceGraphBuilder::new(&machine, BuilderOptions::default())
        .build(&procedure)
        .unwrap_err();
    match error.kind() {
        ErrorKind::IllegalProgram(_) => {}
        other => panic!("expected IllegalProgram, got {:?}", other),
    }
}

#[test]
fn port_guards_are_rejected() {
    expect_illegal_program(&single_block_procedure(vec![Move::guarded(
        Source::Immediate(1),
        Destination::Register(reg(7)),
        Guard::port("LSU.ready", false),
    )]));
}

#[test]
fn unknown_operation_is_an_illegal_machine() {
    let procedure = single_block_procedure(vec![Move::new(
        Source::Immediate(1),
        Destination::FuPort(PortWrite::trigger("FROB", 1)),
    )]);
    let error = DataDependenceGraphBuilder::new(&MINIMAL, BuilderOptions::default())
        .build(&procedure)
        .unwrap_err();
    match error.kind() {
        ErrorKind::IllegalMachine(_) => {}
        other => panic!("expected IllegalMachine, got {:?}", other),
    }
}
