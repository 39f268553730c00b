fn main() {
    timesheet_gateway_lib::run()
}
